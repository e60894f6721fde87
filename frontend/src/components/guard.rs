use crate::auth::use_auth;
use crate::web::router::use_router;
use leptos::prelude::*;
use seatrack::{AppRoute, GuardDecision, decide};

/// 加载占位
#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-[50vh]">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 路由守卫组件
///
/// 挂载期间持有一个 `AccessGuard`：会话消失时重定向到登录页，
/// 已登录用户访问登录/注册页时重定向到个人中心。卸载时自动取消订阅。
#[component]
pub fn Guarded(
    /// 被守卫的路由
    route: AppRoute,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let guard = auth.mount_guard(route, move |target| router.redirect(target));
    // 随组件的 owner 一起释放
    let _guard = StoredValue::new_local(guard);

    let decision = Memo::new(move |_| auth.state.with(|state| decide(route, state)));

    move || match decision.get() {
        GuardDecision::Render => children().into_any(),
        GuardDecision::Pending => view! { <Spinner /> }.into_any(),
        GuardDecision::Redirect(_) => ().into_any(),
    }
}
