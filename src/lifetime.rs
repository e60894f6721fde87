use std::cell::Cell;
use std::rc::Rc;

/// 视图存活标记
///
/// 视图卸载时调用 `end()`；之后到达的异步完成回调必须检查 `is_active()` 并放弃更新。
#[derive(Debug, Clone)]
pub struct ViewLifetime(Rc<Cell<bool>>);

impl ViewLifetime {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    pub fn end(&self) {
        self.0.set(false);
    }
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}
