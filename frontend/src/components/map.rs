use crate::auth::use_auth;
use crate::components::guard::Spinner;
use crate::components::lifetime::use_view_lifetime;
use leptos::prelude::*;
use leptos::task::spawn_local;
use seatrack::external::{MapViewState, PositionSource, recenter, resolve_map_view};

/// 地图页（公开）
///
/// 定位失败时以固定坐标居中，页面不会进入错误状态。
#[component]
pub fn MapPage() -> impl IntoView {
    let auth = use_auth();
    let lifetime = use_view_lifetime();
    let view_state = RwSignal::new(Option::<MapViewState>::None);
    let locating = RwSignal::new(true);

    {
        let services = auth.services();
        let lifetime = lifetime.clone();
        spawn_local(async move {
            let resolved = resolve_map_view(&services.geolocation, &services.config.map).await;
            if lifetime.is_active() {
                view_state.set(Some(resolved));
                locating.set(false);
            }
        });
    }

    let lifetime = StoredValue::new_local(lifetime);
    let on_recenter = move |_| {
        let (Some(current), Some(lifetime)) = (view_state.get_untracked(), lifetime.try_get_value()) else {
            return;
        };
        locating.set(true);
        let services = auth.services();
        spawn_local(async move {
            let next = recenter(&services.geolocation, current).await;
            if lifetime.is_active() {
                view_state.set(Some(next));
                locating.set(false);
            }
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-4">
                <div class="flex items-center justify-between">
                    <h1 class="text-3xl font-bold">"Navigation"</h1>
                    <button
                        class="btn btn-primary btn-sm"
                        on:click=on_recenter
                        disabled=move || locating.get()
                    >
                        "Ma position"
                    </button>
                </div>
                {move || match view_state.get() {
                    None => view! { <Spinner /> }.into_any(),
                    Some(state) => view! {
                        <div class="space-y-2">
                            {(state.source == PositionSource::Fallback).then(|| view! {
                                <div role="alert" class="alert alert-warning">
                                    "Position indisponible, carte centrée sur une position par défaut"
                                </div>
                            })}
                            <iframe
                                title="Carte"
                                class="w-full h-[70vh] rounded-box shadow-xl"
                                src=state.embed_url()
                            ></iframe>
                            <p class="text-sm text-base-content/70">{state.center.to_string()}</p>
                        </div>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}
