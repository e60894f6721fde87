use futures::stream::LocalBoxStream;
use seatrack_shared::Session;
use std::rc::Rc;
use thiserror::Error;

/// 身份服务返回的错误
///
/// 只在 `SessionManager` 内部被映射为 `AppError`。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("malformed email")]
    InvalidEmail,
    #[error("password too weak")]
    WeakPassword,
    #[error("email already in use")]
    EmailInUse,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account disabled")]
    Disabled,
    #[error("too many attempts")]
    TooManyAttempts,
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// 外部身份服务
///
/// 这是整个应用中唯一接触认证后端的接口，只有 `SessionManager` 调用它。
#[async_trait::async_trait(?Send)]
pub trait IdentityService {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn end_session(&self) -> Result<(), IdentityError>;

    /// 当前身份的变化流：第一项是当前值，之后每次变化产出一项
    fn observe(&self) -> LocalBoxStream<'static, Option<Session>>;
}

/// 会话管理器和文档存储共用同一个身份服务实例
#[async_trait::async_trait(?Send)]
impl<I: IdentityService + ?Sized> IdentityService for Rc<I> {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        (**self).create_account(email, password).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        (**self).authenticate(email, password).await
    }

    async fn end_session(&self) -> Result<(), IdentityError> {
        (**self).end_session().await
    }

    fn observe(&self) -> LocalBoxStream<'static, Option<Session>> {
        (**self).observe()
    }
}
