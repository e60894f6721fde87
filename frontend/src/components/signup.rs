use crate::auth::{sign_up, use_auth};
use crate::components::notice::{BlockingError, NoticeToast, report};
use crate::web::router::Link;
use leptos::prelude::*;
use leptos::task::spawn_local;
use seatrack::session::SignUpRequest;
use seatrack::{AppRoute, Notice};

/// 注册页
#[component]
pub fn SignupPage() -> impl IntoView {
    let auth = use_auth();
    let notice_ms = auth.services().config.notice_duration_ms;

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let password_confirm = RwSignal::new(String::new());
    let is_submitting = RwSignal::new(false);
    let error_msg = RwSignal::new(Option::<Notice>::None);
    let blocking = RwSignal::new(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        is_submitting.set(true);
        error_msg.set(None);
        blocking.set(None);

        let request = SignUpRequest {
            email: email.get_untracked(),
            password: password.get_untracked(),
            password_confirm: password_confirm.get_untracked(),
        };
        spawn_local(async move {
            if let Err(e) = sign_up(&auth, request).await {
                report(&e, error_msg, blocking);
            }
            is_submitting.try_set(false);
        });
    };

    let input = move |id: &'static str, label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    on:input=move |ev| value.set(event_target_value(&ev))
                    prop:value=value
                    class="input input-bordered"
                    required
                />
            </div>
        }
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
                    <h1 class="text-3xl font-bold">"Inscription"</h1>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <BlockingError message=blocking />
                        {input("email", "Email", "email", email)}
                        {input("password", "Mot de passe", "password", password)}
                        {input("password-confirm", "Confirmer le mot de passe", "password", password_confirm)}
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Inscription..." }.into_any()
                                } else {
                                    "S'inscrire".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-center text-sm mt-2">
                            <Link to=AppRoute::Login class="link link-primary">
                                "Déjà un compte ? Se connecter"
                            </Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
