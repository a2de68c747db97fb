use gloo::events::EventListener;
use shared::broadcast::{ActiveChild, SelectionBroadcaster};
use wasm_bindgen::JsCast;
use web_sys::StorageEvent;
use yew::prelude::*;

#[derive(Clone, PartialEq)]
pub struct ActiveChildState {
    pub child_id: Option<String>,
    /// Increments on every change so dependent hooks can refetch
    pub change_counter: u32,
}

pub struct UseActiveChildResult {
    pub state: ActiveChildState,
    pub actions: UseActiveChildActions,
}

#[derive(Clone, PartialEq)]
pub struct UseActiveChildActions {
    /// Select a child by id and display name
    pub select: Callback<(String, String)>,
    pub clear: Callback<()>,
}

/// The page-wide selected child, kept current through the broadcaster
#[hook]
pub fn use_active_child(active: &ActiveChild) -> UseActiveChildResult {
    let child_id = use_state(|| active.get_selected());
    let change_counter = use_state(|| 0u32);

    {
        let active = active.clone();
        let child_id = child_id.clone();
        let change_counter = change_counter.clone();

        use_effect_with(active.clone(), move |_| {
            // pick up anything written between the first render and now
            child_id.set(active.get_selected());

            let counter = std::rc::Rc::new(std::cell::Cell::new(*change_counter));
            let subscription = active.on_changed(move |change| {
                counter.set(counter.get().wrapping_add(1));
                change_counter.set(counter.get());
                child_id.set(change.child_id.clone());
            });
            move || drop(subscription)
        });
    }

    let select = {
        let active = active.clone();
        use_callback(active, |(id, name): (String, String), active| {
            active.select(&id, Some(&name));
        })
    };

    let clear = {
        let active = active.clone();
        use_callback(active, |_: (), active| active.clear())
    };

    UseActiveChildResult {
        state: ActiveChildState {
            child_id: (*child_id).clone(),
            change_counter: *change_counter,
        },
        actions: UseActiveChildActions { select, clear },
    }
}

/// Forward `storage` events from other tabs into the broadcaster.
///
/// Mount once per page; the listener is removed on unmount.
#[hook]
pub fn use_storage_bridge(broadcaster: &SelectionBroadcaster) {
    let broadcaster = broadcaster.clone();
    use_effect_with((), move |_| {
        let listener = web_sys::window().map(|window| {
            EventListener::new(&window, "storage", move |event| {
                if let Some(event) = event.dyn_ref::<StorageEvent>() {
                    broadcaster.notify_external(event.key().as_deref(), event.new_value().as_deref());
                }
            })
        });
        move || drop(listener)
    });
}
