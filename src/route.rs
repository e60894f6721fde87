//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖于 DOM。
//! 定义了应用的所有路由及其访问属性，路径是对外可见的导航契约。

use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    /// 首页
    #[default]
    Home,
    Login,
    Signup,
    /// 个人中心 (需要认证)
    Profile,
    /// 个人信息表单 (需要认证)
    PersonalInfo,
    /// 船只档案表单 (需要认证)
    Boat,
    Map,
    Weather,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 所有可寻址的路由
    pub const ADDRESSABLE: [AppRoute; 8] = [
        AppRoute::Home,
        AppRoute::Login,
        AppRoute::Signup,
        AppRoute::Profile,
        AppRoute::PersonalInfo,
        AppRoute::Boat,
        AppRoute::Map,
        AppRoute::Weather,
    ];

    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/auth/login" => Self::Login,
            "/auth/signup" => Self::Signup,
            "/profile" => Self::Profile,
            "/profile/personal-info" => Self::PersonalInfo,
            "/profile/boat" => Self::Boat,
            "/map" => Self::Map,
            "/weather" => Self::Weather,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/auth/login",
            Self::Signup => "/auth/signup",
            Self::Profile => "/profile",
            Self::PersonalInfo => "/profile/personal-info",
            Self::Boat => "/profile/boat",
            Self::Map => "/map",
            Self::Weather => "/weather",
            Self::NotFound => "/404",
        }
    }

    /// 页面标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Home => "SeaTrack",
            Self::Login => "Connexion",
            Self::Signup => "Inscription",
            Self::Profile => "Profil",
            Self::PersonalInfo => "Informations Personnelles",
            Self::Boat => "Mon Bateau",
            Self::Map => "Navigation",
            Self::Weather => "Météo",
            Self::NotFound => "Page introuvable",
        }
    }

    /// **核心守卫规则：该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Profile | Self::PersonalInfo | Self::Boat)
    }

    /// 已认证用户是否应该离开此路由（登录/注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Profile
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
