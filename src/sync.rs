//! 资源同步
//!
//! 把表单的内存字段绑定到文档存储中以 `(集合, 身份)` 为 key 的一条记录。
//! 每个视图实例拥有自己独立的快照，只有 `submit` 会写存储。

mod resources;

pub use resources::{BoatField, PersonalInfoField, validate_boat};

use crate::error::{AppError, AppResult};
use crate::lifetime::ViewLifetime;
use seatrack_shared::{Identity, ResourceKind, Session};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;
use thiserror::Error;

pub const LOAD_FAILED_MESSAGE: &str = "Erreur lors du chargement";
pub const SAVE_FAILED_MESSAGE: &str = "Erreur lors de la sauvegarde";

// =========================================================
// 文档存储接口
// =========================================================

/// 扁平文档：字段名 -> JSON 值
pub type Document = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed document: {0}")]
    Malformed(String),
}

#[async_trait::async_trait(?Send)]
pub trait DocumentStore {
    /// 记录不存在时返回 `Ok(None)`
    async fn get_record(
        &self,
        collection: &str,
        key: &Identity,
    ) -> Result<Option<Document>, StoreError>;

    /// 整条覆盖写入
    async fn put_record(
        &self,
        collection: &str,
        key: &Identity,
        fields: &Document,
    ) -> Result<(), StoreError>;
}

// =========================================================
// 资源类型
// =========================================================

/// 一种按用户存储的记录
///
/// 字段通过类型化的 `Field` 枚举访问，不使用字符串键。
pub trait Resource: Serialize + DeserializeOwned + Default + Clone + PartialEq + 'static {
    type Field: Copy + Eq + Debug + 'static;

    const KIND: ResourceKind;
    const SAVED_MESSAGE: &'static str;

    fn set_field(&mut self, field: Self::Field, value: String);

    fn field(&self, field: Self::Field) -> String;

    /// 提交前的字段校验
    fn validate(&self) -> AppResult<()>;

    fn to_document(&self) -> Result<Document, StoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Malformed(format!(
                "expected an object, got {}",
                other
            ))),
            Err(e) => Err(StoreError::Malformed(e.to_string())),
        }
    }

    fn from_document(document: Document) -> Result<Self, StoreError> {
        serde_json::from_value(Value::Object(document))
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

// =========================================================
// 状态机
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// 空白，尚未开始加载
    #[default]
    Idle,
    Loading,
    Loaded,
    LoadFailed,
    Dirty,
    Saving,
    /// 保存成功，新快照已成为基线
    ///
    /// 对提交的处理与 `Loaded` 相同；下一次编辑后按基线回到 `Loaded` 或 `Dirty`。
    Saved,
    SaveFailed,
}

impl SyncPhase {
    /// 初始加载结束（成功或失败）之前禁止提交，避免用空白覆盖已有记录
    pub fn can_submit(&self) -> bool {
        !matches!(self, SyncPhase::Idle | SyncPhase::Loading | SyncPhase::Saving)
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SyncPhase::Loading | SyncPhase::Saving)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// 可关闭的临时提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

struct SyncModel<R> {
    phase: SyncPhase,
    fields: R,
    /// 最近一次从存储读取或成功写入的快照
    baseline: R,
    notice: Option<Notice>,
    /// 已经为哪个身份发起过加载
    loaded_for: Option<Identity>,
}

impl<R: Resource> SyncModel<R> {
    fn settle_after_edit(&mut self) {
        let changed = self.fields != self.baseline;
        self.phase = match self.phase {
            SyncPhase::Loaded | SyncPhase::Dirty | SyncPhase::Saved => {
                if changed {
                    SyncPhase::Dirty
                } else {
                    SyncPhase::Loaded
                }
            }
            SyncPhase::LoadFailed | SyncPhase::SaveFailed if changed => SyncPhase::Dirty,
            other => other,
        };
    }
}

// =========================================================
// ResourceSync
// =========================================================

pub struct ResourceSync<R: Resource, S: DocumentStore> {
    store: Rc<S>,
    model: RefCell<SyncModel<R>>,
    lifetime: ViewLifetime,
}

impl<R: Resource, S: DocumentStore> ResourceSync<R, S> {
    pub fn new(store: Rc<S>) -> Self {
        Self {
            store,
            model: RefCell::new(SyncModel {
                phase: SyncPhase::Idle,
                fields: R::default(),
                baseline: R::default(),
                notice: None,
                loaded_for: None,
            }),
            lifetime: ViewLifetime::new(),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.model.borrow().phase
    }

    pub fn fields(&self) -> R {
        self.model.borrow().fields.clone()
    }

    pub fn field(&self, field: R::Field) -> String {
        self.model.borrow().fields.field(field)
    }

    pub fn notice(&self) -> Option<Notice> {
        self.model.borrow().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.model.borrow_mut().notice = None;
    }

    /// 视图卸载；之后到达的加载/保存结果都被忽略
    pub fn unmount(&self) {
        self.lifetime.end();
    }

    pub fn is_mounted(&self) -> bool {
        self.lifetime.is_active()
    }

    /// 加载触发规则
    ///
    /// 会话出现且尚未为该身份发起加载时返回需要加载的身份，并同步进入 `Loading`。
    /// 每次会话变化调用一次即可，重复调用不会重复加载。
    pub fn watch_identity(&self, session: Option<&Session>) -> Option<Identity> {
        let session = session?;
        if !self.lifetime.is_active() {
            return None;
        }
        let mut model = self.model.borrow_mut();
        if model.loaded_for.as_ref() == Some(&session.identity) {
            return None;
        }
        model.loaded_for = Some(session.identity.clone());
        model.phase = SyncPhase::Loading;
        Some(session.identity.clone())
    }

    /// 读取记录；不存在时保持空白，不视为错误
    pub async fn load(&self, identity: &Identity) -> AppResult<()> {
        let collection = R::KIND.collection();
        let result = self.store.get_record(collection, identity).await;

        if !self.lifetime.is_active() {
            log::debug!("[Sync] {} load finished after unmount, dropped", R::KIND);
            return Ok(());
        }

        let decoded = match result {
            Ok(Some(document)) => R::from_document(document).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        let mut model = self.model.borrow_mut();
        if model.loaded_for.as_ref() != Some(identity) {
            return Ok(());
        }

        match decoded {
            Ok(record) => {
                if record.is_none() {
                    log::info!("[Sync] no {} record for {} yet", R::KIND, identity);
                }
                let record = record.unwrap_or_default();
                model.fields = record.clone();
                model.baseline = record;
                model.phase = SyncPhase::Loaded;
                Ok(())
            }
            Err(e) => {
                log::error!("[Sync] failed to load {} for {}: {}", R::KIND, identity, e);
                model.phase = SyncPhase::LoadFailed;
                model.notice = Some(Notice::error(LOAD_FAILED_MESSAGE));
                Err(AppError::PersistenceFailed(e.to_string()))
            }
        }
    }

    /// 纯内存更新，不触碰存储
    pub fn set_field(&self, field: R::Field, value: impl Into<String>) {
        let mut model = self.model.borrow_mut();
        model.fields.set_field(field, value.into());
        model.settle_after_edit();
    }

    /// 提交的同步部分：就绪检查、字段校验，然后进入 `Saving`
    pub fn prepare_submit(&self) -> AppResult<R> {
        let mut model = self.model.borrow_mut();
        if !model.phase.can_submit() {
            return Err(AppError::NotReady(if model.phase == SyncPhase::Saving {
                "save in progress"
            } else {
                "initial load not finished"
            }));
        }
        if let Err(e) = model.fields.validate() {
            log::debug!("[Sync] {} rejected before write: {}", R::KIND, e);
            model.notice = Some(Notice::error(e.user_message()));
            return Err(e);
        }
        model.phase = SyncPhase::Saving;
        model.notice = None;
        Ok(model.fields.clone())
    }

    /// 提交的异步部分：用快照整条覆盖记录
    ///
    /// 失败时保留内存中的编辑，供用户重试。
    pub async fn commit(&self, identity: &Identity, snapshot: R) -> AppResult<()> {
        let collection = R::KIND.collection();
        let result = match snapshot.to_document() {
            Ok(document) => self.store.put_record(collection, identity, &document).await,
            Err(e) => Err(e),
        };

        if !self.lifetime.is_active() {
            log::debug!("[Sync] {} save finished after unmount, dropped", R::KIND);
            return result.map_err(|e| AppError::PersistenceFailed(e.to_string()));
        }

        let mut model = self.model.borrow_mut();
        match result {
            Ok(()) => {
                log::info!("[Sync] saved {} for {}", R::KIND, identity);
                model.phase = if model.fields == snapshot {
                    SyncPhase::Saved
                } else {
                    SyncPhase::Dirty
                };
                model.baseline = snapshot;
                model.notice = Some(Notice::success(R::SAVED_MESSAGE));
                Ok(())
            }
            Err(e) => {
                log::error!("[Sync] failed to save {} for {}: {}", R::KIND, identity, e);
                model.phase = SyncPhase::SaveFailed;
                model.notice = Some(Notice::error(SAVE_FAILED_MESSAGE));
                Err(AppError::PersistenceFailed(e.to_string()))
            }
        }
    }

    pub async fn submit(&self, session: &Session) -> AppResult<()> {
        let snapshot = self.prepare_submit()?;
        self.commit(&session.identity, snapshot).await
    }
}
