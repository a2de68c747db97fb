pub mod api;
pub mod date_utils;
pub mod logging;
pub mod storage;

use shared::broadcast::ActiveChild;
use shared::config::DashboardConfig;
use std::rc::Rc;

use api::ApiClient;
use storage::LocalStorageCell;

/// Everything the pages share: the backend client, the active-child
/// selection and configuration
#[derive(Clone)]
pub struct Services {
    pub api: ApiClient,
    pub active: ActiveChild,
    pub config: Rc<DashboardConfig>,
}

impl Services {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            api: ApiClient::new(&config),
            active: ActiveChild::new(Rc::new(LocalStorageCell)),
            config: Rc::new(config),
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        self.api == other.api && self.active == other.active && Rc::ptr_eq(&self.config, &other.config)
    }
}
