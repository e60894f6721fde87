//! LocalStorage 封装模块
//!
//! 凭据与配置覆盖都以 JSON 形式保存在浏览器 LocalStorage 中。

use gloo_storage::{LocalStorage, Storage};
use seatrack::remote::{CredentialStore, StoredCredential};

const CREDENTIAL_KEY: &str = "seatrack_credential";

/// 浏览器中的凭据存储
///
/// 页面刷新后由身份服务的 `observe()` 读取，恢复上一次的会话。
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCredentialStore;

impl CredentialStore for LocalCredentialStore {
    fn load(&self) -> Option<StoredCredential> {
        LocalStorage::get(CREDENTIAL_KEY).ok()
    }

    fn save(&self, credential: &StoredCredential) {
        if let Err(e) = LocalStorage::set(CREDENTIAL_KEY, credential) {
            log::warn!("[Storage] failed to persist credential: {}", e);
        }
    }

    fn clear(&self) {
        LocalStorage::delete(CREDENTIAL_KEY);
    }
}

/// 读取 JSON 值；键不存在或内容损坏时返回 None
pub fn read_json(key: &str) -> Option<serde_json::Value> {
    match LocalStorage::get::<serde_json::Value>(key) {
        Ok(value) => Some(value),
        Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => None,
        Err(e) => {
            log::warn!("[Storage] ignoring unreadable `{}`: {}", key, e);
            None
        }
    }
}
