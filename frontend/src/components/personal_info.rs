use crate::auth::use_auth;
use crate::components::guard::Spinner;
use crate::components::notice::NoticeToast;
use crate::components::resource_form::{submit_button, text_input, use_resource_form};
use crate::web::router::Link;
use leptos::prelude::*;
use seatrack::sync::PersonalInfoField;
use seatrack::{AppRoute, SyncPhase};
use seatrack_shared::PersonalInfo;

#[component]
pub fn PersonalInfoPage() -> impl IntoView {
    let notice_ms = use_auth().services().config.notice_duration_ms;
    let form = use_resource_form::<PersonalInfo>();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        form.submit();
    };

    let input = move |field: PersonalInfoField| {
        let kind = match field {
            PersonalInfoField::Email => "email",
            PersonalInfoField::Phone => "tel",
            _ => "text",
        };
        let required = !matches!(field, PersonalInfoField::Phone | PersonalInfoField::Address);
        text_input(form, field, field.label(), kind, required)
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <NoticeToast
                notice=form.notice
                duration_ms=notice_ms
                on_dismiss=move |_| form.dismiss()
            />
            <div class="max-w-xl mx-auto card bg-base-100 shadow-xl">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h1 class="card-title text-2xl">"Informations Personnelles"</h1>
                        <Link to=AppRoute::Profile class="btn btn-ghost btn-sm">"Retour"</Link>
                    </div>
                    {move || if form.phase.get() == SyncPhase::Loading {
                        view! { <Spinner /> }.into_any()
                    } else {
                        view! {
                            <form class="space-y-2" on:submit=on_submit>
                                {PersonalInfoField::ALL.into_iter().map(input).collect_view()}
                                <div class="pt-4">{submit_button(form)}</div>
                            </form>
                        }
                        .into_any()
                    }}
                </div>
            </div>
        </div>
    }
}
