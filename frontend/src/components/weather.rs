use crate::auth::use_auth;
use crate::components::guard::Spinner;
use crate::components::lifetime::use_view_lifetime;
use crate::components::notice::{BlockingError, NoticeToast, report};
use leptos::prelude::*;
use leptos::task::spawn_local;
use seatrack::Notice;
use seatrack::external::{WeatherViewState, load_weather};

fn stat(label: &'static str, value: String) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{label}</div>
            <div class="stat-value text-2xl">{value}</div>
        </div>
    }
}

/// 天气页（公开）
///
/// 每次挂载都重新定位并查询，不缓存结果。
#[component]
pub fn WeatherPage() -> impl IntoView {
    let auth = use_auth();
    let lifetime = use_view_lifetime();
    let notice_ms = auth.services().config.notice_duration_ms;
    let state = RwSignal::new(WeatherViewState::Loading);
    let toast = RwSignal::new(Option::<Notice>::None);
    let blocking = RwSignal::new(Option::<String>::None);

    let services = auth.services();
    spawn_local(async move {
        let loaded = load_weather(&services.geolocation, &services.weather).await;
        if !lifetime.is_active() {
            return;
        }
        if let WeatherViewState::Failed(e) = &loaded {
            report(e, toast, blocking);
        }
        state.set(loaded);
    });

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <NoticeToast
                notice=toast
                duration_ms=notice_ms
                on_dismiss=move |_| toast.set(None)
            />
            <div class="max-w-3xl mx-auto space-y-4">
                <h1 class="text-3xl font-bold">"Météo"</h1>
                {move || match state.get() {
                    WeatherViewState::Loading => view! { <Spinner /> }.into_any(),
                    WeatherViewState::Failed(_) => view! { <BlockingError message=blocking /> }.into_any(),
                    WeatherViewState::Ready { position, snapshot } => view! {
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <h2 class="card-title capitalize">{snapshot.description.clone()}</h2>
                                <p class="text-sm text-base-content/70">{position.to_string()}</p>
                                <div class="stats stats-vertical md:stats-horizontal shadow">
                                    {stat("Température", format!("{} °C", snapshot.rounded_temperature()))}
                                    {stat("Humidité", format!("{} %", snapshot.humidity.round()))}
                                    {stat("Vent", format!("{} km/h", snapshot.wind_speed_kmh()))}
                                    {stat("Pression", format!("{} hPa", snapshot.pressure.round()))}
                                </div>
                            </div>
                        </div>
                    }
                    .into_any(),
                }}
            </div>
        </div>
    }
}
