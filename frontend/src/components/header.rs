use shared::remote::AuthUser;
use web_sys::MouseEvent;
use yew::prelude::*;

use super::child_selector_menu::ChildSelectorMenu;
use crate::route::Page;
use crate::services::Services;

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub services: Services,
    pub user: AuthUser,
    pub page: Page,
    pub on_navigate: Callback<Page>,
    pub on_logout: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let on_logout = {
        let on_logout = props.on_logout.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_logout.emit(());
        })
    };

    let email = props.user.email.clone().unwrap_or_default();

    html! {
        <header class="header">
            <div class="container">
                <h1>{"ChildGuard"}</h1>
                <nav class="nav-links">
                    {for Page::ALL.into_iter().map(|page| {
                        let on_navigate = props.on_navigate.clone();
                        let onclick = Callback::from(move |e: MouseEvent| {
                            e.prevent_default();
                            on_navigate.emit(page);
                        });
                        html! {
                            <a
                                href={page.hash()}
                                class={classes!("nav-link", (page == props.page).then_some("active"))}
                                {onclick}
                            >
                                {page.title()}
                            </a>
                        }
                    })}
                </nav>
                <div class="header-right">
                    <ChildSelectorMenu services={props.services.clone()} parent_id={props.user.id.clone()} />
                    <span class="user-email">{email}</span>
                    <button class="logout-button" onclick={on_logout}>{"Logout"}</button>
                </div>
            </div>
        </header>
    }
}
