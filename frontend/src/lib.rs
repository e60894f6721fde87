//! SeaTrack 前端应用
//!
//! 采用 Context-Driven 的结构：
//! - `web`: 浏览器 API 封装（HTTP、存储、定位、路由）
//! - `auth`: 应用服务与会话状态
//! - `components`: UI 组件层

mod auth;
mod components {
    pub mod boat;
    pub mod guard;
    pub mod home;
    mod lifetime;
    pub mod login;
    pub mod map;
    mod notice;
    pub mod personal_info;
    pub mod profile;
    mod resource_form;
    pub mod signup;
    pub mod weather;
}
mod config;
mod logging;

use crate::auth::{AppServices, AuthContext, init_auth};
use crate::components::boat::BoatPage;
use crate::components::guard::Guarded;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::map::MapPage;
use crate::components::personal_info::PersonalInfoPage;
use crate::components::profile::ProfilePage;
use crate::components::signup::SignupPage;
use crate::components::weather::WeatherPage;

use leptos::prelude::*;
use seatrack::AppRoute;

// 浏览器 API 适配层，实现核心库定义的协作者 trait
pub(crate) mod web {
    pub mod geolocation;
    pub mod http;
    pub mod router;
    pub mod storage;
}

use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 需要守卫的路由（受保护页面以及登录/注册页）包在 `Guarded` 里。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Map => view! { <MapPage /> }.into_any(),
        AppRoute::Weather => view! { <WeatherPage /> }.into_any(),
        AppRoute::Login => view! { <Guarded route=route><LoginPage /></Guarded> }.into_any(),
        AppRoute::Signup => view! { <Guarded route=route><SignupPage /></Guarded> }.into_any(),
        AppRoute::Profile => view! { <Guarded route=route><ProfilePage /></Guarded> }.into_any(),
        AppRoute::PersonalInfo => {
            view! { <Guarded route=route><PersonalInfoPage /></Guarded> }.into_any()
        }
        AppRoute::Boat => view! { <Guarded route=route><BoatPage /></Guarded> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page introuvable"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 先以默认级别安装日志器，配置加载中的警告也能输出
    logging::init("info");
    let config = config::load_config();
    logging::init(&config.log_level);

    // 2. 创建应用服务与认证上下文
    let auth_ctx = AuthContext::new(AppServices::new(config));
    provide_context(auth_ctx);

    // 3. 订阅会话变化并恢复已保存的会话
    init_auth(&auth_ctx);

    view! {
        <Router>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
