use crate::auth::{sign_out, use_auth};
use crate::web::router::Link;
use leptos::prelude::*;
use seatrack::AppRoute;

/// 个人中心（受保护）
#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let email = move || auth.session().map(|s| s.email).unwrap_or_default();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-xl mx-auto card bg-base-100 shadow-xl">
                <div class="card-body space-y-4">
                    <h1 class="card-title text-2xl">"Profil"</h1>
                    <p class="text-base-content/70">{email}</p>
                    <div class="flex flex-col gap-2">
                        <Link to=AppRoute::PersonalInfo class="btn btn-outline">
                            "Informations Personnelles"
                        </Link>
                        <Link to=AppRoute::Boat class="btn btn-outline">
                            "Mon Bateau"
                        </Link>
                    </div>
                    <button on:click=move |_| sign_out(&auth) class="btn btn-outline btn-error">
                        "Déconnexion"
                    </button>
                </div>
            </div>
        </div>
    }
}
