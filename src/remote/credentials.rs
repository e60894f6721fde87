use seatrack_shared::Session;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use std::cell::RefCell;

/// 身份服务签发的凭据，跨页面刷新保留
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    pub session: Session,
    pub id_token: String,
    pub refresh_token: String,
}

/// 凭据持久化（浏览器中为 LocalStorage）
pub trait CredentialStore {
    fn load(&self) -> Option<StoredCredential>;

    fn save(&self, credential: &StoredCredential);

    fn clear(&self);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("no stored credential")]
    Missing,
    /// refresh token 被拒绝，会话已经结束
    #[error("refresh token rejected: {0}")]
    Revoked(String),
    #[error("token service unavailable: {0}")]
    Unavailable(String),
}

/// 文档存储请求所用的访问令牌
///
/// id token 大约一小时后过期，存储收到 401 时调用 `refresh` 换一个新的。
#[async_trait::async_trait(?Send)]
pub trait TokenSource {
    fn id_token(&self) -> Option<String>;

    /// 换取新的 id token；refresh token 被拒绝时清除凭据并结束会话
    async fn refresh(&self) -> Result<String, TokenError>;
}

// =========================================================
// 测试工具: MemoryCredentialStore
// =========================================================

#[cfg(test)]
#[derive(Default)]
pub struct MemoryCredentialStore {
    pub slot: RefCell<Option<StoredCredential>>,
}

#[cfg(test)]
impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<StoredCredential> {
        self.slot.borrow().clone()
    }

    fn save(&self, credential: &StoredCredential) {
        *self.slot.borrow_mut() = Some(credential.clone());
    }

    fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}
