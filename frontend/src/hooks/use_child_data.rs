use shared::broadcast::ActiveChild;
use shared::error::DashboardError;
use shared::overview::FetchStamp;
use std::future::Future;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

/// Data loaded for the selected child
#[derive(Clone, PartialEq)]
pub enum ChildData<T> {
    NoChild,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> ChildData<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            ChildData::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

pub struct UseChildDataResult<T> {
    pub data: ChildData<T>,
    /// Fetch again for the same child, e.g. after a write
    pub reload: Callback<()>,
}

/// Run `fetch` for the selected child whenever the selection changes or
/// `reload` is emitted.
///
/// A result is dropped if the selection moved on while it was in flight.
#[hook]
pub fn use_child_data<T, F, Fut>(active: &ActiveChild, child_id: Option<String>, fetch: F) -> UseChildDataResult<T>
where
    T: Clone + 'static,
    F: Fn(String) -> Fut + 'static,
    Fut: Future<Output = Result<T, DashboardError>> + 'static,
{
    let data = use_state(|| ChildData::<T>::NoChild);
    let reload_counter = use_state(|| 0u32);

    {
        let data = data.clone();
        let active = active.clone();
        use_effect_with((child_id, *reload_counter), move |(child_id, _)| {
            match child_id.clone() {
                None => data.set(ChildData::NoChild),
                Some(id) => {
                    data.set(ChildData::Loading);
                    let stamp = FetchStamp::new(Some(&id));
                    let request = fetch(id);
                    spawn_local(async move {
                        let result = request.await;
                        if !stamp.is_current(active.get_selected().as_deref()) {
                            return;
                        }
                        data.set(match result {
                            Ok(value) => ChildData::Loaded(value),
                            Err(e) => {
                                log::warn!("Loading data for child {:?} failed: {}", stamp.child_id(), e);
                                ChildData::Failed(e.user_message())
                            }
                        });
                    });
                }
            }
            || ()
        });
    }

    let reload = {
        let reload_counter = reload_counter.clone();
        Callback::from(move |_| reload_counter.set(reload_counter.wrapping_add(1)))
    };

    UseChildDataResult {
        data: (*data).clone(),
        reload,
    }
}
