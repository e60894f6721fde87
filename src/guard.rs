//! 访问守卫
//!
//! 受保护的路由只在会话存在时渲染；会话缺失时重定向到登录页，
//! 启动阶段身份尚未确定时既不渲染也不重定向。

use crate::route::AppRoute;
use crate::session::{IdentityService, SessionManager, SessionState, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// 身份尚未确定，显示加载占位
    Pending,
    Redirect(AppRoute),
}

/// 纯函数：给定路由和会话状态，决定视图该做什么
pub fn decide(route: AppRoute, state: &SessionState) -> GuardDecision {
    if route.requires_auth() {
        return match state {
            SessionState::Resolving => GuardDecision::Pending,
            SessionState::Absent => GuardDecision::Redirect(AppRoute::auth_failure_redirect()),
            SessionState::Present(_) => GuardDecision::Render,
        };
    }
    if route.should_redirect_when_authenticated() && state.is_present() {
        return GuardDecision::Redirect(AppRoute::auth_success_redirect());
    }
    GuardDecision::Render
}

/// 挂载在某个视图上的守卫
///
/// 挂载时立即评估一次，之后每次会话变化再评估；
/// 结果为重定向时调用 `navigate`。drop 后不再响应。
pub struct AccessGuard {
    route: AppRoute,
    _subscription: Subscription,
}

impl AccessGuard {
    pub fn mount<I: IdentityService>(
        manager: &SessionManager<I>,
        route: AppRoute,
        navigate: impl Fn(AppRoute) + 'static,
    ) -> Self {
        if let GuardDecision::Redirect(target) = decide(route, &manager.state()) {
            log::debug!("[Guard] {} -> {}", route, target);
            navigate(target);
        }

        let subscription = manager.subscribe(move |state| {
            if let GuardDecision::Redirect(target) = decide(route, state) {
                log::debug!("[Guard] {} -> {}", route, target);
                navigate(target);
            }
        });

        Self {
            route,
            _subscription: subscription,
        }
    }

    pub fn route(&self) -> AppRoute {
        self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credentials;
    use crate::session::tests::setup_manager;
    use seatrack_shared::{Identity, Session};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn present() -> SessionState {
        SessionState::Present(Session::new(Identity::new("u1"), "skipper@mer.fr"))
    }

    #[test]
    fn test_decide_protected_routes() {
        for route in [AppRoute::Profile, AppRoute::PersonalInfo, AppRoute::Boat] {
            assert_eq!(decide(route, &SessionState::Resolving), GuardDecision::Pending);
            assert_eq!(
                decide(route, &SessionState::Absent),
                GuardDecision::Redirect(AppRoute::Login)
            );
            assert_eq!(decide(route, &present()), GuardDecision::Render);
        }
    }

    #[test]
    fn test_decide_public_routes() {
        for route in [AppRoute::Home, AppRoute::Map, AppRoute::Weather, AppRoute::NotFound] {
            assert_eq!(decide(route, &SessionState::Resolving), GuardDecision::Render);
            assert_eq!(decide(route, &SessionState::Absent), GuardDecision::Render);
            assert_eq!(decide(route, &present()), GuardDecision::Render);
        }
        assert_eq!(
            decide(AppRoute::Login, &present()),
            GuardDecision::Redirect(AppRoute::Profile)
        );
        assert_eq!(decide(AppRoute::Signup, &SessionState::Absent), GuardDecision::Render);
    }

    #[tokio::test]
    async fn test_guard_follows_session_transitions() {
        let (ctx, manager) = setup_manager();
        ctx.add_account("skipper@mer.fr", "secret1", "u1");
        *ctx.scripted.borrow_mut() = vec![None];
        manager.follow().await;

        let redirects = Rc::new(RefCell::new(Vec::new()));
        let sink = redirects.clone();
        let guard = AccessGuard::mount(&manager, AppRoute::Boat, move |target| {
            sink.borrow_mut().push(target)
        });
        assert_eq!(guard.route(), AppRoute::Boat);
        assert_eq!(*redirects.borrow(), vec![AppRoute::Login]);

        let credentials = Credentials {
            email: "skipper@mer.fr".into(),
            password: "secret1".into(),
        };
        manager.sign_in(&credentials).await.unwrap();
        assert_eq!(decide(AppRoute::Boat, &manager.state()), GuardDecision::Render);
        assert_eq!(redirects.borrow().len(), 1);

        manager.sign_out().await;
        assert_eq!(*redirects.borrow(), vec![AppRoute::Login, AppRoute::Login]);

        drop(guard);
        manager.sign_in(&credentials).await.unwrap();
        manager.sign_out().await;
        assert_eq!(redirects.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_guard_waits_while_resolving() {
        let (ctx, manager) = setup_manager();
        let redirects = Rc::new(RefCell::new(Vec::new()));
        let sink = redirects.clone();
        let _guard = AccessGuard::mount(&manager, AppRoute::Profile, move |target| {
            sink.borrow_mut().push(target)
        });
        assert!(redirects.borrow().is_empty());

        *ctx.scripted.borrow_mut() = vec![Some(Session::new(Identity::new("u1"), "a@b.co"))];
        manager.follow().await;
        assert!(redirects.borrow().is_empty());
    }
}
