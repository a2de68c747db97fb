use shared::overview::{self, FetchStamp, OverviewState};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::services::{date_utils, Services};

/// Overview state for the selected child, reloaded on every selection change
#[hook]
pub fn use_overview(services: &Services, child_id: Option<String>) -> OverviewState {
    let state = use_state(|| OverviewState::Idle);

    {
        let state = state.clone();
        let services = services.clone();
        use_effect_with(child_id, move |child_id| {
            let next = OverviewState::start(child_id.as_deref());
            state.set(next.clone());

            if let OverviewState::Loading { child_id } = next {
                let stamp = FetchStamp::new(Some(&child_id));
                spawn_local(async move {
                    let result = overview::load_overview(
                        &services.api,
                        &child_id,
                        date_utils::local_midnight(),
                        services.config.default_time_limit_minutes,
                    )
                    .await;
                    if stamp.is_current(services.active.get_selected().as_deref()) {
                        state.set(OverviewState::finish(result));
                    }
                });
            }
            || ()
        });
    }

    (*state).clone()
}
