use gloo::dialogs::alert;
use shared::format;
use shared::settings::{self, MAX_LIMIT_HOURS, MIN_LIMIT_HOURS};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use super::charts::UsageDonut;
use crate::hooks::{use_active_child, use_time_management, ChildData};
use crate::services::logging::Logger;
use crate::services::Services;

#[derive(Properties, PartialEq)]
pub struct TimeManagementPageProps {
    pub services: Services,
}

#[function_component(TimeManagementPage)]
pub fn time_management_page(props: &TimeManagementPageProps) -> Html {
    let active_child = use_active_child(&props.services.active);
    let child_id = active_child.state.child_id.clone();
    let time_management = use_time_management(&props.services, child_id.clone());
    let slider_hours = use_state(|| 2u32);
    let saving = use_state(|| false);

    // Follow the stored limit whenever fresh settings arrive
    {
        let slider_hours = slider_hours.clone();
        let stored = time_management.data.loaded().map(|data| data.settings.time_limit_minutes);
        use_effect_with(stored, move |stored| {
            if let Some(minutes) = stored {
                slider_hours.set(format::minutes_to_slider_hours(*minutes, MIN_LIMIT_HOURS, MAX_LIMIT_HOURS));
            }
            || ()
        });
    }

    let on_slide = {
        let slider_hours = slider_hours.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Ok(hours) = input.value().parse::<u32>() {
                slider_hours.set(hours);
            }
        })
    };

    let on_save = {
        let services = props.services.clone();
        let slider_hours = slider_hours.clone();
        let saving = saving.clone();
        let reload = time_management.reload.clone();
        let child_id = child_id.clone();
        Callback::from(move |_: MouseEvent| {
            if *saving {
                return;
            }
            let services = services.clone();
            let hours = i64::from(*slider_hours);
            let saving = saving.clone();
            let reload = reload.clone();
            let child_id = child_id.clone();
            saving.set(true);

            spawn_local(async move {
                match settings::save_time_limit_hours(&services.api, child_id.as_deref(), hours).await {
                    Ok(minutes) => {
                        alert(&format!("Daily limit saved: {}", format::limit_label(minutes)));
                        reload.emit(());
                    }
                    Err(e) => {
                        Logger::warn_with_component("TimeManagementPage", &e.to_string());
                        alert(&e.user_message());
                    }
                }
                saving.set(false);
            });
        })
    };

    let body = match &time_management.data {
        ChildData::NoChild => html! { <div class="empty-state">{"No child selected"}</div> },
        ChildData::Loading => html! { <div class="loading-state">{"Loading usage..."}</div> },
        ChildData::Failed(message) => html! { <div class="form-message error">{message.clone()}</div> },
        ChildData::Loaded(data) => {
            let usage = &data.usage;
            html! {
                <>
                    <div class="usage-summary">
                        <UsageDonut used_minutes={usage.used_minutes} remaining_minutes={usage.remaining_minutes()} />
                        <div class="usage-totals">
                            <div>{"Used: "}{format::fmt_time_minutes(u32::try_from(usage.used_minutes).ok())}</div>
                            <div>{"Limit: "}{format::limit_label(usage.limit_minutes)}</div>
                            <div>{"Remaining: "}{format::fmt_time_minutes(u32::try_from(usage.remaining_minutes()).ok())}</div>
                        </div>
                    </div>
                    <table class="site-usage-table">
                        <thead>
                            <tr><th>{"Site or app"}</th><th>{"Time"}</th></tr>
                        </thead>
                        <tbody>
                            if usage.is_empty() {
                                <tr><td colspan="2" class="empty-state">{"No data"}</td></tr>
                            } else {
                                {for usage.sites.iter().map(|site| html! {
                                    <tr>
                                        <td>{site.site.clone()}</td>
                                        <td>{format::fmt_time_minutes(u32::try_from(site.minutes).ok())}</td>
                                    </tr>
                                })}
                            }
                        </tbody>
                    </table>
                </>
            }
        }
    };

    html! {
        <section class="time-management-page">
            <h2>{"Time management"}</h2>
            <div class="limit-control">
                <label for="limit-slider">{format!("Daily limit: {} h", *slider_hours)}</label>
                <input
                    type="range"
                    id="limit-slider"
                    min={MIN_LIMIT_HOURS.to_string()}
                    max={MAX_LIMIT_HOURS.to_string()}
                    step="1"
                    value={slider_hours.to_string()}
                    oninput={on_slide}
                    disabled={child_id.is_none()}
                />
                <button class="btn btn-primary" onclick={on_save} disabled={*saving || child_id.is_none()}>
                    {if *saving { "Saving..." } else { "Save limit" }}
                </button>
            </div>
            {body}
        </section>
    }
}
