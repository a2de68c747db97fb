use log::warn;
use shared::remote::Session;
use shared::selection::{SelectionCell, StorageError, ACTIVE_CHILD_KEY};
use web_sys::Storage;

/// Key holding the signed-in session
pub const SESSION_KEY: &str = "childguard.session";

fn local_storage() -> Result<Storage, StorageError> {
    let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
    window
        .local_storage()
        .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
        .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
}

fn get(key: &str) -> Result<Option<String>, StorageError> {
    local_storage()?
        .get_item(key)
        .map_err(|e| StorageError::Operation(format!("{:?}", e)))
}

fn set(key: &str, value: &str) -> Result<(), StorageError> {
    local_storage()?
        .set_item(key, value)
        .map_err(|e| StorageError::Operation(format!("{:?}", e)))
}

fn remove(key: &str) -> Result<(), StorageError> {
    local_storage()?
        .remove_item(key)
        .map_err(|e| StorageError::Operation(format!("{:?}", e)))
}

/// The active-child slot in `window.localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageCell;

impl SelectionCell for LocalStorageCell {
    fn read(&self) -> Result<Option<String>, StorageError> {
        get(ACTIVE_CHILD_KEY)
    }

    fn write(&self, child_id: &str) -> Result<(), StorageError> {
        set(ACTIVE_CHILD_KEY, child_id)
    }

    fn remove(&self) -> Result<(), StorageError> {
        remove(ACTIVE_CHILD_KEY)
    }
}

pub fn load_session() -> Option<Session> {
    let raw = match get(SESSION_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Could not read stored session: {}", e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("Discarding unreadable stored session: {}", e);
            clear_session();
            None
        }
    }
}

pub fn save_session(session: &Session) {
    let result = serde_json::to_string(session)
        .map_err(|e| StorageError::Operation(e.to_string()))
        .and_then(|raw| set(SESSION_KEY, &raw));
    if let Err(e) = result {
        warn!("Could not persist session: {}", e);
    }
}

pub fn clear_session() {
    if let Err(e) = remove(SESSION_KEY) {
        warn!("Could not clear stored session: {}", e);
    }
}
