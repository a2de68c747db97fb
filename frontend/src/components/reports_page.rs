use shared::format;
use yew::prelude::*;

use super::charts::UsageBarChart;
use crate::hooks::{use_active_child, use_weekly_report, ChildData};
use crate::services::Services;

#[derive(Properties, PartialEq)]
pub struct ReportsPageProps {
    pub services: Services,
}

#[function_component(ReportsPage)]
pub fn reports_page(props: &ReportsPageProps) -> Html {
    let active_child = use_active_child(&props.services.active);
    let report = use_weekly_report(&props.services, active_child.state.child_id.clone());
    let days = props.services.config.report_window_days;

    html! {
        <section class="reports-page">
            <h2>{format!("Last {} days", days)}</h2>
            {match &report.data {
                ChildData::NoChild => html! { <div class="empty-state">{"No child selected"}</div> },
                ChildData::Loading => html! { <div class="loading-state">{"Loading report..."}</div> },
                ChildData::Failed(message) => html! { <div class="form-message error">{message.clone()}</div> },
                ChildData::Loaded(report) => html! {
                    <>
                        <UsageBarChart days={report.days.clone()} />
                        <table class="report-table">
                            <thead>
                                <tr><th>{"Day"}</th><th>{"Hours"}</th></tr>
                            </thead>
                            <tbody>
                                {for report.days.iter().map(|day| html! {
                                    <tr>
                                        <td>{day.key()}</td>
                                        <td>{format::hours_label(day.hours)}</td>
                                    </tr>
                                })}
                            </tbody>
                            <tfoot>
                                <tr><td>{"Total"}</td><td>{format::hours_label(report.total_hours())}</td></tr>
                            </tfoot>
                        </table>
                    </>
                },
            }}
        </section>
    }
}
