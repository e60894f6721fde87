//! 认证模块
//!
//! 把核心库的 `SessionManager` 接入 Leptos：会话变化通过订阅写入信号，
//! 组件只读信号，所有写操作都经过 `SessionManager`。

use crate::web::geolocation::BrowserGeolocation;
use crate::web::http::FetchHttpClient;
use crate::web::storage::LocalCredentialStore;
use leptos::prelude::*;
use leptos::task::spawn_local;
use seatrack::config::ClientConfig;
use seatrack::external::OpenWeatherClient;
use seatrack::remote::{FirestoreStore, RestIdentityService};
use seatrack::session::{Credentials, SessionManager, SessionState, SignUpRequest, Subscription};
use seatrack::{AppResult, AccessGuard, AppRoute};
use seatrack_shared::Session;
use std::rc::Rc;

pub type IdentityClient = RestIdentityService<FetchHttpClient, LocalCredentialStore>;
/// 会话管理器与文档存储共用，存储靠它刷新过期的 id token
pub type IdentityBackend = Rc<IdentityClient>;
pub type RecordStore = FirestoreStore<FetchHttpClient, IdentityClient>;

/// 应用级服务，整个进程只有一份
pub struct AppServices {
    pub config: ClientConfig,
    pub session: SessionManager<IdentityBackend>,
    pub store: Rc<RecordStore>,
    pub geolocation: BrowserGeolocation,
    pub weather: OpenWeatherClient<FetchHttpClient>,
}

impl AppServices {
    pub fn new(config: ClientConfig) -> Self {
        let identity = Rc::new(RestIdentityService::new(
            FetchHttpClient,
            config.backend.clone(),
            Rc::new(LocalCredentialStore),
        ));
        let store = FirestoreStore::new(FetchHttpClient, config.backend.clone(), identity.clone());
        let weather = OpenWeatherClient::new(FetchHttpClient, config.weather.clone());

        Self {
            session: SessionManager::new(identity),
            store: Rc::new(store),
            geolocation: BrowserGeolocation,
            weather,
            config,
        }
    }
}

/// 认证上下文
///
/// 只包含 Copy 句柄，可以放进 Context 并在视图闭包中自由捕获。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 会话状态（只读镜像）
    pub state: ReadSignal<SessionState>,
    set_state: WriteSignal<SessionState>,
    services: StoredValue<Rc<AppServices>, LocalStorage>,
    subscription: StoredValue<Option<Subscription>, LocalStorage>,
}

impl AuthContext {
    pub fn new(services: AppServices) -> Self {
        let (state, set_state) = signal(services.session.state());
        Self {
            state,
            set_state,
            services: StoredValue::new_local(Rc::new(services)),
            subscription: StoredValue::new_local(None),
        }
    }

    pub fn services(&self) -> Rc<AppServices> {
        self.services.get_value()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.with(|s| s.session().cloned())
    }

    /// 在守卫挂载期间按会话变化重定向
    pub fn mount_guard(&self, route: AppRoute, navigate: impl Fn(AppRoute) + 'static) -> AccessGuard {
        AccessGuard::mount(&self.services().session, route, navigate)
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 订阅会话变化，然后在后台跟随身份服务的变化流（第一项来自 LocalStorage 中保存的凭据）。
pub fn init_auth(ctx: &AuthContext) {
    let services = ctx.services();
    let set_state = ctx.set_state;
    let subscription = services.session.subscribe(move |state| {
        set_state.try_set(state.clone());
    });
    ctx.subscription.set_value(Some(subscription));

    let missing = services.config.missing_keys();
    if !missing.is_empty() {
        log::warn!("[Config] missing configuration: {}", missing.join(", "));
    }

    spawn_local(async move {
        services.session.follow().await;
    });
}

pub async fn sign_in(ctx: &AuthContext, email: String, password: String) -> AppResult<Session> {
    let services = ctx.services();
    services
        .session
        .sign_in(&Credentials { email, password })
        .await
}

pub async fn sign_up(ctx: &AuthContext, request: SignUpRequest) -> AppResult<Session> {
    let services = ctx.services();
    services.session.sign_up(&request).await
}

/// 注销
///
/// 导航将由守卫监听会话变化自动处理。
pub fn sign_out(ctx: &AuthContext) {
    let services = ctx.services();
    spawn_local(async move {
        services.session.sign_out().await;
    });
}
