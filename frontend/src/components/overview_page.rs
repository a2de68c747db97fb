use shared::overview::OverviewState;
use yew::prelude::*;

use crate::hooks::{use_active_child, use_overview};
use crate::services::Services;

#[derive(Properties, PartialEq)]
pub struct OverviewPageProps {
    pub services: Services,
}

#[function_component(OverviewPage)]
pub fn overview_page(props: &OverviewPageProps) -> Html {
    let active_child = use_active_child(&props.services.active);
    let state = use_overview(&props.services, active_child.state.child_id.clone());

    let card = |label: &str, value: String| {
        html! {
            <div class="stat-card">
                <span class="stat-label">{label.to_string()}</span>
                <span class="stat-value">{value}</span>
            </div>
        }
    };

    html! {
        <section class="overview-page">
            <h2>{"Today"}</h2>
            {match &state {
                OverviewState::Empty => html! {
                    <div class="empty-state">{"No child selected"}</div>
                },
                OverviewState::Loading { .. } | OverviewState::Idle => html! {
                    <div class="loading-state">{"Loading..."}</div>
                },
                OverviewState::Failed(message) => html! {
                    <div class="form-message error">{message.clone()}</div>
                },
                OverviewState::Loaded(_) => html! {},
            }}
            <div class="stat-grid">
                {card("VPN", state.vpn_text())}
                {card("Daily limit", state.limit_text())}
                {card("Used today", state.used_text())}
                {card("Blocked attempts", state.blocked_text())}
            </div>
        </section>
    }
}
