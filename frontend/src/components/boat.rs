use crate::auth::use_auth;
use crate::components::guard::Spinner;
use crate::components::notice::NoticeToast;
use crate::components::resource_form::{FormState, submit_button, text_input, use_resource_form};
use crate::web::router::Link;
use leptos::prelude::*;
use seatrack::sync::BoatField;
use seatrack::{AppRoute, SyncPhase};
use seatrack_shared::date::{construction_years, current_year};
use seatrack_shared::{BoatProfile, BoatType};

/// 船型下拉框，空值表示尚未选择
fn boat_type_select(form: FormState<BoatProfile>) -> impl IntoView {
    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">{BoatField::Type.label()}" *"</span>
            </label>
            <select
                class="select select-bordered w-full"
                prop:value=move || form.field(BoatField::Type)
                on:change=move |ev| form.set_field(BoatField::Type, event_target_value(&ev))
                disabled=move || form.is_busy()
            >
                <option value="">"Sélectionner un type"</option>
                {BoatType::ALL
                    .into_iter()
                    .map(|t| view! { <option value=t.label()>{t.label()}</option> })
                    .collect_view()}
            </select>
        </div>
    }
}

fn year_input(form: FormState<BoatProfile>) -> impl IntoView {
    let years = construction_years(current_year());
    view! {
        <div class="form-control">
            <label class="label">
                <span class="label-text">{BoatField::Year.label()}</span>
            </label>
            <input
                type="number"
                class="input input-bordered w-full"
                min=*years.start()
                max=*years.end()
                prop:value=move || form.field(BoatField::Year)
                on:input=move |ev| form.set_field(BoatField::Year, event_target_value(&ev))
                disabled=move || form.is_busy()
            />
        </div>
    }
}

#[component]
pub fn BoatPage() -> impl IntoView {
    let notice_ms = use_auth().services().config.notice_duration_ms;
    let form = use_resource_form::<BoatProfile>();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        form.submit();
    };

    let field_view = move |field: BoatField| match field {
        BoatField::Type => boat_type_select(form).into_any(),
        BoatField::Year => year_input(form).into_any(),
        BoatField::Length | BoatField::Width | BoatField::Draft => {
            // 允许逗号作为小数点，所以用文本框
            text_input(form, field, field.label(), "text", true).into_any()
        }
        _ => text_input(form, field, field.label(), "text", field.is_required()).into_any(),
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <NoticeToast
                notice=form.notice
                duration_ms=notice_ms
                on_dismiss=move |_| form.dismiss()
            />
            <div class="max-w-2xl mx-auto card bg-base-100 shadow-xl">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h1 class="card-title text-2xl">"Mon Bateau"</h1>
                        <Link to=AppRoute::Profile class="btn btn-ghost btn-sm">"Retour"</Link>
                    </div>
                    {move || if form.phase.get() == SyncPhase::Loading {
                        view! { <Spinner /> }.into_any()
                    } else {
                        view! {
                            <form class="grid grid-cols-1 md:grid-cols-2 gap-x-4 gap-y-2" on:submit=on_submit>
                                {BoatField::ALL.into_iter().map(field_view).collect_view()}
                                <div class="md:col-span-2 pt-4">{submit_button(form)}</div>
                            </form>
                        }
                        .into_any()
                    }}
                </div>
            </div>
        </div>
    }
}
