use super::*;
use async_trait::async_trait;
use futures::stream::{self, LocalBoxStream};
use seatrack_shared::Identity;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

// =========================================================
// Shared Mock Components
// =========================================================

pub(crate) struct IdentityContext {
    /// Operation log to verify calling order
    pub log: RefCell<Vec<String>>,
    /// email -> (password, identity)
    accounts: RefCell<HashMap<String, (String, Identity)>>,
    /// 模拟身份服务注销失败
    pub fail_end_session: Cell<bool>,
    /// 模拟网络不可达
    pub unavailable: Cell<bool>,
    /// observe() 产出的脚本
    pub scripted: RefCell<Vec<Option<Session>>>,
}

impl IdentityContext {
    pub fn new() -> Self {
        Self {
            log: RefCell::new(Vec::new()),
            accounts: RefCell::new(HashMap::new()),
            fail_end_session: Cell::new(false),
            unavailable: Cell::new(false),
            scripted: RefCell::new(Vec::new()),
        }
    }

    pub fn add_account(&self, email: &str, password: &str, id: &str) {
        self.accounts
            .borrow_mut()
            .insert(email.to_string(), (password.to_string(), Identity::new(id)));
    }

    pub fn calls(&self) -> usize {
        self.log.borrow().len()
    }
}

pub(crate) struct MockIdentityService {
    pub ctx: Rc<IdentityContext>,
}

#[async_trait(?Send)]
impl IdentityService for MockIdentityService {
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.ctx.log.borrow_mut().push(format!("create:{}", email));
        if self.ctx.unavailable.get() {
            return Err(IdentityError::Unavailable("offline".into()));
        }
        let mut accounts = self.ctx.accounts.borrow_mut();
        if accounts.contains_key(email) {
            return Err(IdentityError::EmailInUse);
        }
        let identity = Identity::new(format!("uid-{}", accounts.len() + 1));
        accounts.insert(email.to_string(), (password.to_string(), identity.clone()));
        Ok(Session::new(identity, email))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        self.ctx.log.borrow_mut().push(format!("authenticate:{}", email));
        if self.ctx.unavailable.get() {
            return Err(IdentityError::Unavailable("offline".into()));
        }
        match self.ctx.accounts.borrow().get(email) {
            Some((stored, identity)) if stored == password => {
                Ok(Session::new(identity.clone(), email))
            }
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn end_session(&self) -> Result<(), IdentityError> {
        self.ctx.log.borrow_mut().push("end_session".to_string());
        if self.ctx.fail_end_session.get() {
            return Err(IdentityError::Unavailable("offline".into()));
        }
        Ok(())
    }

    fn observe(&self) -> LocalBoxStream<'static, Option<Session>> {
        let items: Vec<_> = self.ctx.scripted.borrow_mut().drain(..).collect();
        Box::pin(stream::iter(items))
    }
}

pub(crate) fn setup_manager() -> (Rc<IdentityContext>, SessionManager<MockIdentityService>) {
    let ctx = Rc::new(IdentityContext::new());
    let manager = SessionManager::new(MockIdentityService { ctx: ctx.clone() });
    (ctx, manager)
}

fn record_states(
    manager: &SessionManager<MockIdentityService>,
) -> (Rc<RefCell<Vec<SessionState>>>, Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let subscription = manager.subscribe(move |state| sink.borrow_mut().push(state.clone()));
    (seen, subscription)
}

fn sign_up_request(email: &str, password: &str, confirm: &str) -> SignUpRequest {
    SignUpRequest {
        email: email.to_string(),
        password: password.to_string(),
        password_confirm: confirm.to_string(),
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

// =========================================================
// Tests
// =========================================================

#[test]
fn test_email_format() {
    assert!(is_well_formed_email("marin@port.fr"));
    assert!(is_well_formed_email("  a.b@mer.co.uk "));
    assert!(!is_well_formed_email("marin"));
    assert!(!is_well_formed_email("@port.fr"));
    assert!(!is_well_formed_email("marin@port"));
    assert!(!is_well_formed_email("marin@port."));
    assert!(!is_well_formed_email("ma rin@port.fr"));
    assert!(!is_well_formed_email("a@b@port.fr"));
}

#[tokio::test]
async fn test_sign_up_mismatched_confirmation_never_calls_service() {
    let (ctx, manager) = setup_manager();

    let err = manager
        .sign_up(&sign_up_request("a@b.co", "secret1", "secret2"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AppError::validation("passwordConfirm", "Les mots de passe ne correspondent pas")
    );
    assert_eq!(ctx.calls(), 0);
    assert_eq!(manager.state(), SessionState::Resolving);
}

#[tokio::test]
async fn test_sign_up_rejects_bad_format_locally() {
    let (ctx, manager) = setup_manager();

    let err = manager
        .sign_up(&sign_up_request("not-an-email", "secret1", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentialsFormat(_)));

    let err = manager
        .sign_up(&sign_up_request("a@b.co", "abc", "abc"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentialsFormat(_)));

    assert_eq!(ctx.calls(), 0);
}

#[tokio::test]
async fn test_sign_up_success_notifies_subscribers() {
    let (_, manager) = setup_manager();
    let (seen, _subscription) = record_states(&manager);

    let session = manager
        .sign_up(&sign_up_request("skipper@mer.fr", "secret1", "secret1"))
        .await
        .unwrap();

    assert_eq!(session.email, "skipper@mer.fr");
    assert_eq!(manager.current_session(), Some(session.clone()));
    assert_eq!(*seen.borrow(), vec![SessionState::Present(session)]);
}

#[tokio::test]
async fn test_sign_up_existing_account() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");

    let err = manager
        .sign_up(&sign_up_request("skipper@mer.fr", "autre12", "autre12"))
        .await
        .unwrap_err();

    assert_eq!(err, AppError::AccountAlreadyExists);
    assert!(!manager.state().is_present());
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");

    let wrong_password = manager
        .sign_in(&credentials("skipper@mer.fr", "mauvais"))
        .await
        .unwrap_err();
    let unknown = manager
        .sign_in(&credentials("inconnu@mer.fr", "secret1"))
        .await
        .unwrap_err();

    assert_eq!(wrong_password, AppError::AuthenticationFailed);
    assert_eq!(wrong_password, unknown);
    assert_eq!(wrong_password.user_message(), unknown.user_message());
}

#[tokio::test]
async fn test_sign_in_empty_fields_skip_service() {
    let (ctx, manager) = setup_manager();

    let err = manager.sign_in(&credentials("", "secret1")).await.unwrap_err();
    assert_eq!(err, AppError::AuthenticationFailed);
    let err = manager.sign_in(&credentials("a@b.co", "")).await.unwrap_err();
    assert_eq!(err, AppError::AuthenticationFailed);

    assert_eq!(ctx.calls(), 0);
}

#[tokio::test]
async fn test_sign_in_network_failure_is_authentication_failure() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");
    ctx.unavailable.set(true);

    let err = manager
        .sign_in(&credentials("skipper@mer.fr", "secret1"))
        .await
        .unwrap_err();
    assert_eq!(err, AppError::AuthenticationFailed);
}

#[tokio::test]
async fn test_sign_in_trims_email() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");

    let session = manager
        .sign_in(&credentials("  skipper@mer.fr ", "secret1"))
        .await
        .unwrap();
    assert_eq!(session.identity, Identity::new("u1"));
}

#[tokio::test]
async fn test_sign_out_is_idempotent() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");
    manager
        .sign_in(&credentials("skipper@mer.fr", "secret1"))
        .await
        .unwrap();

    manager.sign_out().await;
    assert_eq!(manager.state(), SessionState::Absent);
    manager.sign_out().await;
    assert_eq!(manager.state(), SessionState::Absent);

    let end_calls = ctx
        .log
        .borrow()
        .iter()
        .filter(|entry| *entry == "end_session")
        .count();
    assert_eq!(end_calls, 1);
}

#[tokio::test]
async fn test_sign_out_clears_session_even_if_service_fails() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");
    ctx.fail_end_session.set(true);
    manager
        .sign_in(&credentials("skipper@mer.fr", "secret1"))
        .await
        .unwrap();

    manager.sign_out().await;

    assert_eq!(manager.state(), SessionState::Absent);
}

#[tokio::test]
async fn test_notifications_only_on_transitions() {
    let (ctx, manager) = setup_manager();
    let session = Session::new(Identity::new("u1"), "skipper@mer.fr");
    *ctx.scripted.borrow_mut() = vec![
        None,
        None,
        Some(session.clone()),
        Some(session.clone()),
        None,
    ];
    let (seen, _subscription) = record_states(&manager);

    manager.follow().await;

    assert_eq!(
        *seen.borrow(),
        vec![
            SessionState::Absent,
            SessionState::Present(session),
            SessionState::Absent,
        ]
    );
}

#[tokio::test]
async fn test_dropped_subscription_stops_receiving() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");
    let (seen, subscription) = record_states(&manager);

    manager
        .sign_in(&credentials("skipper@mer.fr", "secret1"))
        .await
        .unwrap();
    drop(subscription);
    manager.sign_out().await;

    assert_eq!(seen.borrow().len(), 1);
    assert!(seen.borrow()[0].is_present());
}

#[tokio::test]
async fn test_follow_resolves_initial_state() {
    let (ctx, manager) = setup_manager();
    let session = Session::new(Identity::new("u7"), "restored@mer.fr");
    *ctx.scripted.borrow_mut() = vec![Some(session.clone())];

    assert_eq!(manager.state(), SessionState::Resolving);
    manager.follow().await;

    assert!(manager.state().is_present());
    assert_eq!(manager.current_session(), Some(session));
}

#[tokio::test]
async fn test_subscriber_may_read_manager_state() {
    let (ctx, manager) = setup_manager();
    ctx.add_account("skipper@mer.fr", "secret1", "u1");
    let manager = Rc::new(manager);
    let weak = Rc::downgrade(&manager);
    let observed = Rc::new(Cell::new(false));
    let flag = observed.clone();
    let _subscription = manager.subscribe(move |state| {
        if let Some(manager) = weak.upgrade() {
            flag.set(manager.state() == *state);
        }
    });

    manager
        .sign_in(&credentials("skipper@mer.fr", "secret1"))
        .await
        .unwrap();

    assert!(observed.get());
}
