//! 会话管理模块
//!
//! 持有进程内唯一的认证状态，并通过订阅/通知向视图广播变化。
//! 所有读者都显式地拿到状态，而不是从全局单例读取。

mod identity;

pub use identity::{IdentityError, IdentityService};

use crate::error::{AppError, AppResult};
use futures::StreamExt;
use seatrack_shared::Session;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const MIN_PASSWORD_LEN: usize = 6;

// =========================================================
// 会话状态
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// 启动时，身份服务尚未给出当前身份
    #[default]
    Resolving,
    Absent,
    Present(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Present(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SessionState::Present(_))
    }
}

impl From<Option<Session>> for SessionState {
    fn from(value: Option<Session>) -> Self {
        match value {
            Some(session) => SessionState::Present(session),
            None => SessionState::Absent,
        }
    }
}

// =========================================================
// 表单输入
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl SignUpRequest {
    /// 在调用身份服务之前完成的本地校验
    pub fn validate(&self) -> AppResult<()> {
        if self.password != self.password_confirm {
            return Err(AppError::validation(
                "passwordConfirm",
                "Les mots de passe ne correspondent pas",
            ));
        }
        if !is_well_formed_email(&self.email) {
            return Err(AppError::InvalidCredentialsFormat("malformed email".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidCredentialsFormat(format!(
                "password shorter than {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// 粗略的邮箱格式检查：`local@domain.tld`，不含空白
pub fn is_well_formed_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}

// =========================================================
// 订阅
// =========================================================

type Callback = Rc<dyn Fn(&SessionState)>;

#[derive(Default)]
struct Observers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// 订阅句柄，drop 时自动取消订阅
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    observers: Weak<RefCell<Observers>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers
                .borrow_mut()
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

// =========================================================
// SessionManager
// =========================================================

pub struct SessionManager<I: IdentityService> {
    identity: I,
    state: RefCell<SessionState>,
    observers: Rc<RefCell<Observers>>,
}

impl<I: IdentityService> SessionManager<I> {
    pub fn new(identity: I) -> Self {
        Self {
            identity,
            state: RefCell::new(SessionState::Resolving),
            observers: Rc::new(RefCell::new(Observers::default())),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// 订阅状态变化（只在状态真正改变时回调）
    pub fn subscribe(&self, callback: impl Fn(&SessionState) + 'static) -> Subscription {
        let mut observers = self.observers.borrow_mut();
        let id = observers.next_id;
        observers.next_id += 1;
        observers.entries.push((id, Rc::new(callback)));
        Subscription {
            id,
            observers: Rc::downgrade(&self.observers),
        }
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> AppResult<Session> {
        request.validate()?;

        let email = request.email.trim();
        match self.identity.create_account(email, &request.password).await {
            Ok(session) => {
                log::info!("[Session] account created for {}", session.identity);
                self.transition(SessionState::Present(session.clone()));
                Ok(session)
            }
            Err(e) => {
                log::warn!("[Session] sign-up rejected: {}", e);
                Err(match e {
                    IdentityError::InvalidEmail | IdentityError::WeakPassword => {
                        AppError::InvalidCredentialsFormat(e.to_string())
                    }
                    IdentityError::EmailInUse => AppError::AccountAlreadyExists,
                    _ => AppError::AuthenticationFailed,
                })
            }
        }
    }

    /// 登录；任何失败都统一为 `AuthenticationFailed`，不区分账号是否存在
    pub async fn sign_in(&self, credentials: &Credentials) -> AppResult<Session> {
        let email = credentials.email.trim();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(AppError::AuthenticationFailed);
        }

        match self.identity.authenticate(email, &credentials.password).await {
            Ok(session) => {
                log::info!("[Session] signed in as {}", session.identity);
                self.transition(SessionState::Present(session.clone()));
                Ok(session)
            }
            Err(e) => {
                log::warn!("[Session] sign-in rejected: {}", e);
                Err(AppError::AuthenticationFailed)
            }
        }
    }

    /// 注销；没有会话时什么也不做
    pub async fn sign_out(&self) {
        if !self.state.borrow().is_present() {
            return;
        }
        if let Err(e) = self.identity.end_session().await {
            log::warn!("[Session] identity service failed to end session: {}", e);
        }
        self.transition(SessionState::Absent);
    }

    /// 跟随身份服务的变化流，直到流结束
    ///
    /// 第一项决定启动时的会话，之后的项对应外部的凭据变化。
    pub async fn follow(&self) {
        let mut changes = self.identity.observe();
        while let Some(next) = changes.next().await {
            self.transition(SessionState::from(next));
        }
        log::debug!("[Session] identity stream closed");
    }

    fn transition(&self, next: SessionState) {
        {
            let mut state = self.state.borrow_mut();
            if *state == next {
                return;
            }
            log::debug!(
                "[Session] {} -> {}",
                describe(&state),
                describe(&next)
            );
            *state = next.clone();
        }

        // 先复制回调列表，回调里允许重新进入 manager
        let callbacks: Vec<Callback> = self
            .observers
            .borrow()
            .entries
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in callbacks {
            callback(&next);
        }
    }
}

fn describe(state: &SessionState) -> String {
    match state {
        SessionState::Resolving => "resolving".to_string(),
        SessionState::Absent => "absent".to_string(),
        SessionState::Present(session) => format!("present({})", session.identity),
    }
}

#[cfg(test)]
pub(crate) mod tests;
