use log::{info, warn};

use crate::error::DashboardError;
use crate::remote::{Query, TableStore};
use crate::{tables, Child};

/// Fetch the parent's children, sorted by name (ties by id)
pub async fn list_children(store: &dyn TableStore, parent_id: &str) -> Result<Vec<Child>, DashboardError> {
    info!("Listing children for parent {}", parent_id);

    let query = Query::new()
        .columns("id,name,parent_id")
        .eq("parent_id", parent_id)
        .order_by("name", true);
    let children: Vec<Child> = store
        .select_as(tables::CHILDREN, &query)
        .await
        .map_err(DashboardError::fetch("children"))?;

    info!("Found {} children", children.len());
    Ok(sort_children(children))
}

pub fn sort_children(mut children: Vec<Child>) -> Vec<Child> {
    children.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    children
}

/// Pick the child to show: the saved one if it is still in the list,
/// otherwise the first child
pub fn resolve_active<'a>(children: &'a [Child], saved: Option<&str>) -> Option<&'a Child> {
    if let Some(saved) = saved {
        if let Some(child) = children.iter().find(|c| c.id == saved) {
            return Some(child);
        }
        warn!("Saved child {} is no longer available, falling back to the first child", saved);
    }
    children.first()
}

/// What the picker should do to the selection cell after a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// The cell already holds the right value
    Keep,
    /// Write this child and notify listeners
    Select { child_id: String, name: String },
    /// Remove a stale id and notify listeners
    Clear,
}

/// Rendering state of the child picker
#[derive(Debug, Clone, PartialEq)]
pub enum PickerState {
    Loading,
    SignedOut,
    Empty,
    Failed(String),
    Ready { children: Vec<Child>, active_id: String },
}

impl PickerState {
    /// Turn a children fetch into a picker state and the selection update it
    /// implies.
    ///
    /// A failed fetch leaves the selection alone.
    pub fn from_fetch(result: Result<Vec<Child>, DashboardError>, saved: Option<&str>) -> (Self, SelectionAction) {
        match result {
            Err(e) => {
                warn!("Child picker could not load children: {}", e);
                (PickerState::Failed(e.user_message()), SelectionAction::Keep)
            }
            Ok(children) => {
                let children = sort_children(children);
                let Some(active) = resolve_active(&children, saved).cloned() else {
                    let action = if saved.is_some() {
                        SelectionAction::Clear
                    } else {
                        SelectionAction::Keep
                    };
                    return (PickerState::Empty, action);
                };
                let action = if saved == Some(active.id.as_str()) {
                    SelectionAction::Keep
                } else {
                    SelectionAction::Select {
                        child_id: active.id.clone(),
                        name: active.name.clone(),
                    }
                };
                (
                    PickerState::Ready {
                        children,
                        active_id: active.id,
                    },
                    action,
                )
            }
        }
    }

    /// Mark a different child active after a click
    pub fn with_active(&self, child_id: &str) -> Self {
        match self {
            PickerState::Ready { children, .. } if children.iter().any(|c| c.id == child_id) => PickerState::Ready {
                children: children.clone(),
                active_id: child_id.to_string(),
            },
            other => other.clone(),
        }
    }

    pub fn active_child(&self) -> Option<&Child> {
        match self {
            PickerState::Ready { children, active_id } => children.iter().find(|c| &c.id == active_id),
            _ => None,
        }
    }

    /// Text of the nav toggle
    pub fn toggle_label(&self) -> String {
        match self {
            PickerState::Loading => "Child: Loading…".to_string(),
            _ => match self.active_child() {
                Some(child) => format!("Child: {}", child.name),
                None => "Child: —".to_string(),
            },
        }
    }
}

/// Up to two upper-case initials for the avatar circle
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "C".to_string()
    } else {
        letters
    }
}
