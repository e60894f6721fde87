use crate::auth::{sign_in, use_auth};
use crate::components::notice::{BlockingError, NoticeToast, report};
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;
use seatrack::{AppRoute, Notice};

/// 登录页
///
/// 成功后由守卫把已登录用户带到个人中心。
#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let notice_ms = auth.services().config.notice_duration_ms;

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let error_msg = RwSignal::new(Option::<Notice>::None);
    let blocking = RwSignal::new(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        error_msg.set(None);
        blocking.set(None);

        spawn_local(async move {
            let result = sign_in(&auth, email.get_untracked(), password.get_untracked()).await;
            if let Err(e) = result {
                report(&e, error_msg, blocking);
            }
            set_is_submitting.try_set(false);
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <NoticeToast
                notice=error_msg
                duration_ms=notice_ms
                on_dismiss=move |_| error_msg.set(None)
            />
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <h1 class="text-3xl font-bold">"Connexion"</h1>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <BlockingError message=blocking />
                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                autocomplete="email"
                                on:input=move |ev| set_email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Mot de passe"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Connexion..." }.into_any()
                                } else {
                                    "Se connecter".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            <Link to=AppRoute::Signup class="link link-primary">
                                "Pas encore de compte ? S'inscrire"
                            </Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
