use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use seatrack::{AppError, Notice, NoticeKind, Presentation};

/// 按错误的呈现方式分流：通知类进 toast，阻塞类整块显示在视图里
pub fn report(
    error: &AppError,
    toast: RwSignal<Option<Notice>>,
    blocking: RwSignal<Option<String>>,
) {
    match error.presentation() {
        Presentation::Notification => {
            toast.try_set(Some(Notice::error(error.user_message())));
        }
        Presentation::Blocking => {
            blocking.try_set(Some(error.user_message()));
        }
    }
}

/// 阻塞错误，占据视图内容区域
#[component]
pub fn BlockingError(#[prop(into)] message: Signal<Option<String>>) -> impl IntoView {
    move || {
        message.get().map(|message| {
            view! {
                <div role="alert" class="alert alert-error">
                    <span>{message}</span>
                </div>
            }
        })
    }
}

/// 右上角的临时提示
///
/// 出现后 `duration_ms` 毫秒自动消失，也可以手动关闭。
#[component]
pub fn NoticeToast(
    #[prop(into)] notice: Signal<Option<Notice>>,
    duration_ms: u64,
    #[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
    // 新提示出现时替换旧的计时器，drop 即取消
    let timer = StoredValue::new_local(None::<Timeout>);

    Effect::new(move |_| {
        let visible = notice.with(|n| n.is_some());
        let next = visible.then(|| {
            Timeout::new(duration_ms.min(u64::from(u32::MAX)) as u32, move || {
                on_dismiss.run(())
            })
        });
        timer.set_value(next);
    });

    move || {
        notice.get().map(|Notice { kind, message }| {
            let class = match kind {
                NoticeKind::Success => "alert alert-success shadow-lg",
                NoticeKind::Error => "alert alert-error shadow-lg",
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div role="alert" class=class>
                        <span>{message}</span>
                        <button
                            class="btn btn-sm btn-ghost"
                            aria-label="Fermer"
                            on:click=move |_| on_dismiss.run(())
                        >
                            "✕"
                        </button>
                    </div>
                </div>
            }
        })
    }
}
