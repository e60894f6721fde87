use super::credentials::{CredentialStore, StoredCredential, TokenError, TokenSource};
use crate::config::BackendConfig;
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::session::{IdentityError, IdentityService};
use futures::StreamExt;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::LocalBoxStream;
use seatrack_shared::{Identity, Session};
use serde::Deserialize;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

// =========================================================
// 响应结构
// =========================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthPayload {
    local_id: String,
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

/// 令牌服务的响应字段是 snake_case
#[derive(Deserialize)]
struct RefreshPayload {
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// 把身份服务的错误代码映射为 `IdentityError`
///
/// 代码后面可能跟着说明，例如 `WEAK_PASSWORD : Password should be at least 6 characters`。
fn map_error_code(message: &str) -> IdentityError {
    let code = message.split([' ', ':']).next().unwrap_or_default();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "INVALID_EMAIL" | "MISSING_EMAIL" => IdentityError::InvalidEmail,
        "WEAK_PASSWORD" | "MISSING_PASSWORD" => IdentityError::WeakPassword,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "USER_DISABLED" => IdentityError::Disabled,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => IdentityError::TooManyAttempts,
        other => IdentityError::Unavailable(other.to_string()),
    }
}

fn error_from_response(resp: &HttpResponse) -> IdentityError {
    match resp.json::<ErrorEnvelope>() {
        Ok(envelope) => map_error_code(&envelope.error.message),
        Err(_) => IdentityError::Unavailable(format!("status {}", resp.status)),
    }
}

// =========================================================
// REST 身份服务
// =========================================================

// https://cloud.google.com/identity-platform/docs/use-rest-api
//
// Request example
// curl -X POST \
//   -H "Content-Type: application/json" \
//   "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=API_KEY" \
//   -d '{"email":"a@b.co","password":"secret1","returnSecureToken":true}'
//
// Response
// { "localId": "...", "email": "a@b.co", "idToken": "...", "refreshToken": "..." }
pub struct RestIdentityService<C: HttpClient, T: CredentialStore> {
    pub(super) client: C,
    config: BackendConfig,
    credentials: Rc<T>,
    watchers: RefCell<Vec<UnboundedSender<Option<Session>>>>,
}

impl<C: HttpClient, T: CredentialStore> RestIdentityService<C, T> {
    pub fn new(client: C, config: BackendConfig, credentials: Rc<T>) -> Self {
        Self {
            client,
            config,
            credentials,
            watchers: RefCell::new(Vec::new()),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.config.identity_base_url, action, self.config.api_key
        )
    }

    fn token_endpoint(&self) -> String {
        format!(
            "{}/token?key={}",
            self.config.secure_token_base_url, self.config.api_key
        )
    }

    /// 凭据已失效：丢弃并通知观察者，会话随之变为 Absent
    fn revoke(&self, reason: &str) -> TokenError {
        log::warn!("[Identity] credential revoked: {}", reason);
        self.credentials.clear();
        self.broadcast(None);
        TokenError::Revoked(reason.to_string())
    }

    async fn exchange(&self, action: &str, email: &str, password: &str) -> Result<Session, IdentityError> {
        let req = HttpRequest::new(&self.endpoint(action), HttpMethod::Post).with_json(json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        }));

        let resp = self
            .client
            .send(req)
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !resp.ok() {
            return Err(error_from_response(&resp));
        }

        let payload: AuthPayload = resp
            .json()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let session = Session::new(Identity::new(payload.local_id), payload.email);
        self.credentials.save(&StoredCredential {
            session: session.clone(),
            id_token: payload.id_token,
            refresh_token: payload.refresh_token,
        });
        self.broadcast(Some(session.clone()));
        Ok(session)
    }

    /// 通知所有仍在监听的 observe() 流，顺便清理已关闭的
    fn broadcast(&self, current: Option<Session>) {
        self.watchers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(current.clone()).is_ok());
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient, T: CredentialStore> IdentityService for RestIdentityService<C, T> {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.exchange("signUp", email, password).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.exchange("signInWithPassword", email, password).await
    }

    /// 令牌是无状态的，注销只需丢弃本地凭据
    async fn end_session(&self) -> Result<(), IdentityError> {
        self.credentials.clear();
        self.broadcast(None);
        Ok(())
    }

    fn observe(&self) -> LocalBoxStream<'static, Option<Session>> {
        let (tx, rx) = mpsc::unbounded();
        let current = self.credentials.load().map(|c| c.session);
        if tx.unbounded_send(current).is_ok() {
            self.watchers.borrow_mut().push(tx);
        }
        rx.boxed_local()
    }
}

// Request example
// curl -X POST \
//   -H "Content-Type: application/json" \
//   "https://securetoken.googleapis.com/v1/token?key=API_KEY" \
//   -d '{"grant_type":"refresh_token","refresh_token":"..."}'
//
// Response
// { "id_token": "...", "refresh_token": "...", "expires_in": "3600", "user_id": "..." }
#[async_trait::async_trait(?Send)]
impl<C: HttpClient, T: CredentialStore> TokenSource for RestIdentityService<C, T> {
    fn id_token(&self) -> Option<String> {
        self.credentials.load().map(|c| c.id_token)
    }

    async fn refresh(&self) -> Result<String, TokenError> {
        let stored = self.credentials.load().ok_or(TokenError::Missing)?;
        if stored.refresh_token.is_empty() {
            return Err(self.revoke("no refresh token"));
        }

        let req = HttpRequest::new(&self.token_endpoint(), HttpMethod::Post).with_json(json!({
            "grant_type": "refresh_token",
            "refresh_token": stored.refresh_token
        }));

        // 网络故障不代表凭据失效，保留会话
        let resp = self
            .client
            .send(req)
            .await
            .map_err(|e| TokenError::Unavailable(e.to_string()))?;

        match resp.status {
            status if (200..300).contains(&status) => {}
            400 | 401 | 403 => {
                let reason = resp
                    .json::<ErrorEnvelope>()
                    .map(|envelope| envelope.error.message)
                    .unwrap_or_else(|_| format!("status {}", resp.status));
                return Err(self.revoke(&reason));
            }
            status => return Err(TokenError::Unavailable(format!("status {}", status))),
        }

        let payload: RefreshPayload = resp
            .json()
            .map_err(|e| TokenError::Unavailable(e.to_string()))?;

        log::debug!("[Identity] id token refreshed for {}", stored.session.identity);
        let refresh_token = if payload.refresh_token.is_empty() {
            stored.refresh_token
        } else {
            payload.refresh_token
        };
        self.credentials.save(&StoredCredential {
            session: stored.session,
            id_token: payload.id_token.clone(),
            refresh_token,
        });
        Ok(payload.id_token)
    }
}
