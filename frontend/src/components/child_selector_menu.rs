use gloo::events::EventListener;
use shared::picker::{self, initials, PickerState, SelectionAction};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{KeyboardEvent, MouseEvent};
use yew::prelude::*;

use crate::hooks::use_active_child;
use crate::services::logging::Logger;
use crate::services::Services;

#[derive(Properties, PartialEq)]
pub struct ChildSelectorMenuProps {
    pub services: Services,
    pub parent_id: String,
}

#[function_component(ChildSelectorMenu)]
pub fn child_selector_menu(props: &ChildSelectorMenuProps) -> Html {
    let is_open = use_state(|| false);
    let picker_state = use_state(|| PickerState::Loading);
    let active_child = use_active_child(&props.services.active);

    // Load the children once per signed-in parent
    {
        let services = props.services.clone();
        let picker_state = picker_state.clone();
        use_effect_with(props.parent_id.clone(), move |parent_id| {
            let parent_id = parent_id.clone();
            picker_state.set(PickerState::Loading);
            spawn_local(async move {
                let result = picker::list_children(&services.api, &parent_id).await;
                let saved = services.active.get_selected();
                let (state, action) = PickerState::from_fetch(result, saved.as_deref());
                match action {
                    SelectionAction::Keep => {}
                    SelectionAction::Select { child_id, name } => {
                        Logger::info_with_component("ChildSelectorMenu", &format!("Selecting {}", name));
                        services.active.select(&child_id, Some(&name));
                    }
                    SelectionAction::Clear => services.active.clear(),
                }
                picker_state.set(state);
            });
            || ()
        });
    }

    // Escape closes the dropdown while it is open
    {
        let is_open = is_open.clone();
        use_effect_with(*is_open, move |open| {
            let listener = if *open {
                web_sys::window().and_then(|window| window.document()).map(|document| {
                    EventListener::new(&document, "keydown", move |event| {
                        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                            if event.key() == "Escape" {
                                is_open.set(false);
                            }
                        }
                    })
                })
            } else {
                None
            };
            move || drop(listener)
        });
    }

    let toggle_menu = {
        let is_open = is_open.clone();
        Callback::from(move |_: MouseEvent| is_open.set(!*is_open))
    };

    let on_backdrop_click = {
        let is_open = is_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            is_open.set(false);
        })
    };

    let on_menu_click = Callback::from(|e: MouseEvent| {
        e.stop_propagation();
    });

    let on_select_child = {
        let is_open = is_open.clone();
        let select = active_child.actions.select.clone();
        Callback::from(move |(child_id, name): (String, String)| {
            select.emit((child_id, name));
            is_open.set(false);
        })
    };

    // The live selection wins over what the picker resolved at load time
    let view_state = match &active_child.state.child_id {
        Some(id) => picker_state.with_active(id),
        None => (*picker_state).clone(),
    };
    let loading = matches!(view_state, PickerState::Loading);
    let avatar = view_state
        .active_child()
        .map(|child| initials(&child.name))
        .unwrap_or_else(|| "?".to_string());

    html! {
        <div class="child-selector-menu">
            <button
                class="child-selector-button"
                onclick={toggle_menu}
                aria-label="Select child"
                aria-expanded={(*is_open).to_string()}
            >
                <span class="child-selector-letter">{avatar}</span>
                <span class="child-selector-label">{view_state.toggle_label()}</span>
            </button>

            if *is_open {
                <>
                    <div class="child-selector-backdrop" onclick={on_backdrop_click}></div>
                    <div class="child-selector-dropdown" onclick={on_menu_click}>
                        {
                            match &view_state {
                                _ if loading => html! {
                                    <div class="child-selector-item loading">
                                        <div class="child-selector-spinner"></div>
                                        <span>{"Loading children..."}</span>
                                    </div>
                                },
                                PickerState::Failed(message) => html! {
                                    <div class="child-selector-item error">
                                        <span>{message.clone()}</span>
                                    </div>
                                },
                                PickerState::Ready { children, active_id } => children.iter().map(|child| {
                                    let is_active = &child.id == active_id;
                                    let on_click = {
                                        let on_select = on_select_child.clone();
                                        let selection = (child.id.clone(), child.name.clone());
                                        Callback::from(move |_: MouseEvent| on_select.emit(selection.clone()))
                                    };

                                    html! {
                                        <div
                                            class={classes!("child-selector-item", is_active.then_some("active"))}
                                            onclick={on_click}
                                        >
                                            <div class="child-avatar">{initials(&child.name)}</div>
                                            <span class="child-name">{child.name.clone()}</span>
                                            if is_active {
                                                <span class="child-active-indicator">{"✓"}</span>
                                            }
                                        </div>
                                    }
                                }).collect::<Html>(),
                                _ => html! {
                                    <div class="child-selector-item no-children">
                                        <span>{"No children found"}</span>
                                    </div>
                                },
                            }
                        }
                    </div>
                </>
            }
        </div>
    }
}
