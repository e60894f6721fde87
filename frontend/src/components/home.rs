use crate::web::router::Link;
use leptos::prelude::*;
use seatrack::AppRoute;

const ENTRIES: [(AppRoute, &str, &str); 3] = [
    (AppRoute::Map, "Navigation", "Carte et position actuelle"),
    (AppRoute::Weather, "Météo", "Conditions à votre position"),
    (AppRoute::Profile, "Profil", "Vos informations et votre bateau"),
];

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-8">
                <h1 class="text-4xl font-bold text-center">"SeaTrack"</h1>
                <div class="grid grid-cols-1 md:grid-cols-3 gap-6">
                    {ENTRIES
                        .into_iter()
                        .map(|(route, title, subtitle)| {
                            view! {
                                <Link to=route class="card bg-base-100 shadow-xl hover:shadow-2xl transition-shadow">
                                    <div class="card-body items-center text-center">
                                        <h2 class="card-title">{title}</h2>
                                        <p class="text-base-content/70">{subtitle}</p>
                                    </div>
                                </Link>
                            }
                        })
                        .collect_view()}
                </div>
            </div>
        </div>
    }
}
