//! 托管后端的 REST 适配器
//!
//! 身份服务与文档存储都建立在 `HttpClient` 之上，浏览器和测试各自提供实现。

mod credentials;
mod firestore;
mod identity_toolkit;

pub use credentials::{CredentialStore, StoredCredential, TokenError, TokenSource};
pub use firestore::{FirestoreStore, decode_fields, encode_fields};
pub use identity_toolkit::RestIdentityService;

#[cfg(test)]
pub use credentials::MemoryCredentialStore;
