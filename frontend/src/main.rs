mod components;
mod hooks;
mod route;
mod services;

use anyhow::Context;
use shared::auth;
use shared::config::DashboardConfig;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use components::{Header, LoginPage, OverviewPage, ReportsPage, TimeManagementPage, WebsiteBlockingPage};
use hooks::{use_session, use_storage_bridge, SessionState};
use route::Page;
use services::logging::Logger;
use services::Services;

#[derive(Properties, PartialEq)]
struct AppProps {
    config: DashboardConfig,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    match props.config.validate() {
        Ok(()) => html! { <Dashboard config={props.config.clone()} /> },
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            html! {
                <div class="config-error">
                    <h2>{"ChildGuard is not configured"}</h2>
                    <p>{e.to_string()}</p>
                </div>
            }
        }
    }
}

#[function_component(Dashboard)]
fn dashboard(props: &AppProps) -> Html {
    let services = use_memo(props.config.clone(), |config| Services::new(config.clone()));
    let services = (*services).clone();
    use_storage_bridge(services.active.broadcaster());
    let session = use_session(&services);
    let page = use_state(Page::current);

    let on_navigate = {
        let page = page.clone();
        Callback::from(move |next: Page| {
            next.push();
            page.set(next);
        })
    };

    let on_logout = {
        let services = services.clone();
        Callback::from(move |_| {
            let services = services.clone();
            spawn_local(async move {
                if let Err(e) = auth::sign_out(&services.api, &services.active).await {
                    Logger::warn_with_component("App", &format!("Sign-out failed: {}", e));
                }
            });
        })
    };

    let content = match &session {
        SessionState::Checking => html! {
            <div class="loading-state">{"Checking session..."}</div>
        },
        SessionState::SignedOut => html! {
            <LoginPage services={services.clone()} />
        },
        SessionState::SignedIn(user) => {
            let body = match *page {
                Page::Overview => html! { <OverviewPage services={services.clone()} /> },
                Page::Reports => html! { <ReportsPage services={services.clone()} /> },
                Page::TimeManagement => html! { <TimeManagementPage services={services.clone()} /> },
                Page::WebsiteBlocking => html! {
                    <WebsiteBlockingPage services={services.clone()} parent_id={user.id.clone()} />
                },
            };
            html! {
                <>
                    <Header
                        services={services.clone()}
                        user={user.clone()}
                        page={*page}
                        on_navigate={on_navigate}
                        on_logout={on_logout}
                    />
                    <main class="container">{body}</main>
                </>
            }
        }
    };

    html! {
        <div class="app">{content}</div>
    }
}

fn run() -> anyhow::Result<()> {
    let config = DashboardConfig::from_build_env(
        option_env!("CHILDGUARD_SUPABASE_URL"),
        option_env!("CHILDGUARD_SUPABASE_ANON_KEY"),
        option_env!("CHILDGUARD_LOG_LEVEL"),
    );
    Logger::init(config.log_level_filter()).context("Failed to install console logger")?;
    log::info!("Starting ChildGuard dashboard");

    yew::Renderer::<App>::with_props(AppProps { config }).render();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        gloo::console::error!(format!("ChildGuard failed to start: {:#}", e));
    }
}
