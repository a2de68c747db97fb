use gloo::dialogs::alert;
use shared::blocking;
use shared::settings::{self, MAX_LIMIT_MINUTES};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::hooks::{use_active_child, use_blocked_sites, ChildData};
use crate::services::date_utils;
use crate::services::logging::Logger;
use crate::services::Services;

const COMPONENT: &str = "WebsiteBlockingPage";
const SETTINGS_UPDATED: &str = "Settings updated.";

fn site_added_notice(domain: &str) -> String {
    format!("Site added: {}", domain)
}

fn limit_saved_notice(minutes: u32) -> String {
    format!("{} Daily limit is {} minutes.", SETTINGS_UPDATED, minutes)
}

#[derive(Properties, PartialEq)]
pub struct WebsiteBlockingPageProps {
    pub services: Services,
    /// Signed-in parent, recorded as `added_by`
    pub parent_id: String,
}

#[function_component(WebsiteBlockingPage)]
pub fn website_blocking_page(props: &WebsiteBlockingPageProps) -> Html {
    let active_child = use_active_child(&props.services.active);
    let child_id = active_child.state.child_id.clone();
    let blocked = use_blocked_sites(&props.services, child_id.clone());
    let domain = use_state(String::new);
    let minutes = use_state(String::new);
    let busy = use_state(|| false);

    {
        let minutes = minutes.clone();
        let stored = blocked.data.loaded().map(|data| data.settings.time_limit_minutes);
        use_effect_with(stored, move |stored| {
            if let Some(value) = stored {
                minutes.set(value.to_string());
            }
            || ()
        });
    }

    let on_domain_input = {
        let domain = domain.clone();
        Callback::from(move |e: InputEvent| {
            domain.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_minutes_input = {
        let minutes = minutes.clone();
        Callback::from(move |e: InputEvent| {
            minutes.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_add = {
        let services = props.services.clone();
        let parent_id = props.parent_id.clone();
        let (domain, busy, child_id) = (domain.clone(), busy.clone(), child_id.clone());
        let reload = blocked.reload.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *busy {
                return;
            }
            let services = services.clone();
            let parent_id = parent_id.clone();
            let (domain, busy, child_id, reload) = (domain.clone(), busy.clone(), child_id.clone(), reload.clone());
            let raw = (*domain).clone();
            busy.set(true);

            spawn_local(async move {
                match blocking::add_site(&services.api, child_id.as_deref(), Some(&parent_id), &raw).await {
                    Ok(stored) => {
                        Logger::info_with_component(COMPONENT, &format!("Blocked {}", stored));
                        domain.set(String::new());
                        alert(&site_added_notice(&stored));
                        reload.emit(());
                    }
                    Err(e) => {
                        Logger::warn_with_component(COMPONENT, &e.to_string());
                        alert(&e.user_message());
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_unblock = {
        let services = props.services.clone();
        let busy = busy.clone();
        let reload = blocked.reload.clone();
        Callback::from(move |site_id: String| {
            let services = services.clone();
            let (busy, reload) = (busy.clone(), reload.clone());
            busy.set(true);

            spawn_local(async move {
                match blocking::unblock_site(&services.api, &site_id).await {
                    Ok(()) => reload.emit(()),
                    Err(e) => {
                        Logger::warn_with_component(COMPONENT, &e.to_string());
                        alert(&e.user_message());
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_save_minutes = {
        let services = props.services.clone();
        let (minutes, busy, child_id) = (minutes.clone(), busy.clone(), child_id.clone());
        let reload = blocked.reload.clone();
        Callback::from(move |_: MouseEvent| {
            let value = match minutes.trim().parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    alert(&format!("Enter a whole number of minutes between 0 and {}", MAX_LIMIT_MINUTES));
                    return;
                }
            };
            let services = services.clone();
            let (busy, child_id, reload) = (busy.clone(), child_id.clone(), reload.clone());
            busy.set(true);

            spawn_local(async move {
                match settings::save_time_limit(&services.api, child_id.as_deref(), value).await {
                    Ok(saved) => {
                        alert(&limit_saved_notice(saved));
                        reload.emit(());
                    }
                    Err(e) => {
                        Logger::warn_with_component(COMPONENT, &e.to_string());
                        alert(&e.user_message());
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_vpn_toggle = {
        let services = props.services.clone();
        let (busy, child_id) = (busy.clone(), child_id.clone());
        let reload = blocked.reload.clone();
        Callback::from(move |e: Event| {
            let enabled = e.target_unchecked_into::<HtmlInputElement>().checked();
            let services = services.clone();
            let (busy, child_id, reload) = (busy.clone(), child_id.clone(), reload.clone());
            busy.set(true);

            spawn_local(async move {
                match settings::set_vpn_enabled(&services.api, child_id.as_deref(), enabled).await {
                    Ok(()) => alert(SETTINGS_UPDATED),
                    Err(e) => {
                        Logger::warn_with_component(COMPONENT, &e.to_string());
                        alert(&e.user_message());
                    }
                }
                reload.emit(());
                busy.set(false);
            });
        })
    };

    let no_child = child_id.is_none();
    let vpn_enabled = blocked.data.loaded().map(|data| data.settings.vpn_enabled).unwrap_or(false);

    let site_list = match &blocked.data {
        ChildData::NoChild => html! { <div class="empty-state">{"No child selected"}</div> },
        ChildData::Loading => html! { <div class="loading-state">{"Loading blocked sites..."}</div> },
        ChildData::Failed(message) => html! { <div class="form-message error">{message.clone()}</div> },
        ChildData::Loaded(data) if data.sites.is_empty() => {
            html! { <div class="empty-state">{"No blocked sites"}</div> }
        }
        ChildData::Loaded(data) => html! {
            <ul class="blocked-list">
                {for data.sites.iter().map(|site| {
                    let on_click = {
                        let on_unblock = on_unblock.clone();
                        let id = site.id.clone();
                        Callback::from(move |_: MouseEvent| on_unblock.emit(id.clone()))
                    };
                    html! {
                        <li class="blocked-item" key={site.id.clone()}>
                            <span class="blocked-domain">{site.domain.clone()}</span>
                            if let Some(created) = site.created_at.as_deref() {
                                <span class="blocked-date">{date_utils::format_short_date(created)}</span>
                            }
                            <button class="btn btn-secondary" onclick={on_click} disabled={*busy}>{"Unblock"}</button>
                        </li>
                    }
                })}
            </ul>
        },
    };

    html! {
        <section class="website-blocking-page">
            <h2>{"Website blocking"}</h2>

            <form class="add-site-form" onsubmit={on_add}>
                <input
                    type="text"
                    placeholder="example.com"
                    value={(*domain).clone()}
                    oninput={on_domain_input}
                    disabled={no_child || *busy}
                />
                <button type="submit" class="btn btn-primary" disabled={no_child || *busy}>{"Block"}</button>
            </form>

            {site_list}

            <div class="settings-panel">
                <div class="form-group">
                    <label for="limit-minutes">{"Daily limit (minutes)"}</label>
                    <input
                        type="number"
                        id="limit-minutes"
                        min="0"
                        max={MAX_LIMIT_MINUTES.to_string()}
                        value={(*minutes).clone()}
                        oninput={on_minutes_input}
                        disabled={no_child || *busy}
                    />
                    <button class="btn btn-primary" onclick={on_save_minutes} disabled={no_child || *busy}>{"Save"}</button>
                </div>
                <label class="vpn-toggle">
                    <input type="checkbox" checked={vpn_enabled} onchange={on_vpn_toggle} disabled={no_child || *busy} />
                    {" Require VPN"}
                </label>
            </div>
        </section>
    }
}
