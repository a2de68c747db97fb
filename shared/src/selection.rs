//! Durable single-slot storage for the active child id.

use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// Key of the slot in the browser's key-value storage
pub const ACTIVE_CHILD_KEY: &str = "active_child_id";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage is unavailable: {0}")]
    Unavailable(String),

    #[error("Storage operation failed: {0}")]
    Operation(String),
}

/// Raw access to the durable slot.
///
/// Implementations report failures; callers go through [`get_selected`],
/// [`set_selected`] and [`clear_selected`], which absorb them.
pub trait SelectionCell {
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&self, child_id: &str) -> Result<(), StorageError>;
    fn remove(&self) -> Result<(), StorageError>;
}

impl<C: SelectionCell + ?Sized> SelectionCell for Rc<C> {
    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, child_id: &str) -> Result<(), StorageError> {
        (**self).write(child_id)
    }

    fn remove(&self) -> Result<(), StorageError> {
        (**self).remove()
    }
}

/// Currently selected child, or `None` when nothing is stored or the
/// storage cannot be read
pub fn get_selected(cell: &dyn SelectionCell) -> Option<String> {
    match cell.read() {
        Ok(Some(id)) if !id.trim().is_empty() => Some(id),
        Ok(_) => None,
        Err(e) => {
            warn!("Reading the selected child failed, treating as no selection: {}", e);
            None
        }
    }
}

/// Persist the selection; returns whether the write went through
pub fn set_selected(cell: &dyn SelectionCell, child_id: &str) -> bool {
    match cell.write(child_id) {
        Ok(()) => true,
        Err(e) => {
            warn!("Saving the selected child {} failed: {}", child_id, e);
            false
        }
    }
}

pub fn clear_selected(cell: &dyn SelectionCell) -> bool {
    match cell.remove() {
        Ok(()) => true,
        Err(e) => {
            warn!("Clearing the selected child failed: {}", e);
            false
        }
    }
}

/// In-process cell, used when no durable storage exists and in tests
#[derive(Debug, Default)]
pub struct MemoryCell {
    value: RefCell<Option<String>>,
}

impl MemoryCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(child_id: &str) -> Self {
        Self {
            value: RefCell::new(Some(child_id.to_string())),
        }
    }
}

impl SelectionCell for MemoryCell {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.borrow().clone())
    }

    fn write(&self, child_id: &str) -> Result<(), StorageError> {
        *self.value.borrow_mut() = Some(child_id.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.value.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenCell;

    impl SelectionCell for BrokenCell {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled by policy".to_string()))
        }

        fn write(&self, _child_id: &str) -> Result<(), StorageError> {
            Err(StorageError::Operation("quota exceeded".to_string()))
        }

        fn remove(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled by policy".to_string()))
        }
    }

    #[test]
    fn test_memory_cell_round_trip() {
        let cell = MemoryCell::new();
        assert_eq!(get_selected(&cell), None);

        assert!(set_selected(&cell, "child-1"));
        assert_eq!(get_selected(&cell), Some("child-1".to_string()));

        assert!(clear_selected(&cell));
        assert_eq!(get_selected(&cell), None);
    }

    #[test]
    fn test_blank_value_reads_as_no_selection() {
        let cell = MemoryCell::with_value("  ");
        assert_eq!(get_selected(&cell), None);
    }

    #[test]
    fn test_storage_failure_degrades_to_no_selection() {
        let cell = BrokenCell;
        assert_eq!(get_selected(&cell), None);
        assert!(!set_selected(&cell, "child-1"));
        assert!(!clear_selected(&cell));
    }

    #[test]
    fn test_rc_cell_shares_state() {
        let cell = Rc::new(MemoryCell::new());
        let other = Rc::clone(&cell);
        set_selected(&cell, "child-9");
        assert_eq!(get_selected(&other), Some("child-9".to_string()));
    }
}
