use leptos::prelude::*;
use seatrack::ViewLifetime;

struct EndOnDrop(ViewLifetime);

impl Drop for EndOnDrop {
    fn drop(&mut self) {
        self.0.end();
    }
}

/// 与当前组件 owner 绑定的生命周期标记，owner 释放时结束
pub fn use_view_lifetime() -> ViewLifetime {
    let lifetime = ViewLifetime::new();
    // 存进 owner 的 arena，随 owner 一起释放
    let _marker = StoredValue::new_local(EndOnDrop(lifetime.clone()));
    lifetime
}
