//! Same-page publish/subscribe for selection changes.
//!
//! Everything here runs on the page's single thread, so listeners are plain
//! `Rc` closures and no locking is involved.

use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::selection::{self, SelectionCell, ACTIVE_CHILD_KEY};

type Handler<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(u64, Handler<T>)>>,
}

/// A list of listeners that can be notified with a `T`
pub struct Channel<T> {
    inner: Rc<Listeners<T>>,
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Channel<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Listeners {
                next_id: Cell::new(0),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register a listener; it stays registered until the returned
    /// [`Subscription`] is dropped
    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.handlers.borrow_mut().push((id, Rc::new(handler)));

        let weak: Weak<Listeners<T>> = Rc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.handlers.borrow_mut().retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Deliver `event` to every listener registered when the call starts.
    ///
    /// Listeners may subscribe or unsubscribe from inside a handler; that
    /// takes effect from the next notification.
    pub fn notify(&self, event: &T) {
        let snapshot: Vec<Handler<T>> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }
}

/// Keeps a listener registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A subscription that owns no listener
    pub fn detached() -> Self {
        Self { unsubscribe: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// Where a selection change came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The picker on this page
    Local,
    /// Another tab or window writing the same storage slot
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub child_id: Option<String>,
    /// Only known for changes made on this page
    pub name: Option<String>,
    pub origin: ChangeOrigin,
}

/// Broadcasts selection changes to every controller on the page
#[derive(Clone, Default)]
pub struct SelectionBroadcaster {
    channel: Channel<SelectionChange>,
}

impl SelectionBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_changed(&self, handler: impl Fn(&SelectionChange) + 'static) -> Subscription {
        self.channel.subscribe(handler)
    }

    pub fn notify_changed(&self, child_id: Option<&str>, name: Option<&str>) {
        debug!("Selection changed to {:?}", child_id);
        self.channel.notify(&SelectionChange {
            child_id: child_id.map(str::to_string),
            name: name.map(str::to_string),
            origin: ChangeOrigin::Local,
        });
    }

    /// Feed a storage-change notification from another browsing context.
    ///
    /// Returns whether the key was the selection slot (and listeners ran).
    pub fn notify_external(&self, key: Option<&str>, new_value: Option<&str>) -> bool {
        if key != Some(ACTIVE_CHILD_KEY) {
            return false;
        }
        let child_id = new_value.filter(|v| !v.trim().is_empty());
        debug!("Selection changed in another window to {:?}", child_id);
        self.channel.notify(&SelectionChange {
            child_id: child_id.map(str::to_string),
            name: None,
            origin: ChangeOrigin::External,
        });
        true
    }

    pub fn listener_count(&self) -> usize {
        self.channel.listener_count()
    }
}

/// Page-local copy of the selection, used while the durable cell rejects
/// writes
struct Mirror {
    value: RefCell<Option<String>>,
    durable: Cell<bool>,
}

/// The page-wide active child: the durable cell plus its broadcaster.
///
/// All mutations record the new value first and notify second, so a
/// listener calling [`ActiveChild::get_selected`] always sees it, even when
/// storage is unavailable.
#[derive(Clone)]
pub struct ActiveChild {
    cell: Rc<dyn SelectionCell>,
    mirror: Rc<Mirror>,
    broadcaster: SelectionBroadcaster,
}

impl ActiveChild {
    pub fn new(cell: Rc<dyn SelectionCell>) -> Self {
        let mirror = Mirror {
            value: RefCell::new(selection::get_selected(cell.as_ref())),
            durable: Cell::new(true),
        };
        Self {
            cell,
            mirror: Rc::new(mirror),
            broadcaster: SelectionBroadcaster::new(),
        }
    }

    pub fn get_selected(&self) -> Option<String> {
        if !self.mirror.durable.get() {
            return self.mirror.value.borrow().clone();
        }
        match self.cell.read() {
            Ok(value) => value.filter(|id| !id.trim().is_empty()),
            Err(e) => {
                debug!("Selection cell unreadable, using page copy: {}", e);
                self.mirror.value.borrow().clone()
            }
        }
    }

    pub fn select(&self, child_id: &str, name: Option<&str>) {
        *self.mirror.value.borrow_mut() = Some(child_id.to_string());
        self.mirror
            .durable
            .set(selection::set_selected(self.cell.as_ref(), child_id));
        self.broadcaster.notify_changed(Some(child_id), name);
    }

    pub fn clear(&self) {
        *self.mirror.value.borrow_mut() = None;
        self.mirror.durable.set(selection::clear_selected(self.cell.as_ref()));
        self.broadcaster.notify_changed(None, None);
    }

    pub fn on_changed(&self, handler: impl Fn(&SelectionChange) + 'static) -> Subscription {
        self.broadcaster.on_changed(handler)
    }

    pub fn broadcaster(&self) -> &SelectionBroadcaster {
        &self.broadcaster
    }
}

impl PartialEq for ActiveChild {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overview::FetchStamp;
    use crate::selection::{MemoryCell, StorageError};

    #[test]
    fn test_channel_delivers_to_all_listeners() {
        let channel: Channel<u32> = Channel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let a = {
            let seen = Rc::clone(&seen);
            channel.subscribe(move |v| seen.borrow_mut().push(("a", *v)))
        };
        let b = {
            let seen = Rc::clone(&seen);
            channel.subscribe(move |v| seen.borrow_mut().push(("b", *v)))
        };

        channel.notify(&7);
        let mut got = seen.borrow().clone();
        got.sort();
        assert_eq!(got, vec![("a", 7), ("b", 7)]);
        assert_eq!(channel.listener_count(), 2);

        drop(a);
        drop(b);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_dropping_subscription_stops_delivery() {
        let channel: Channel<u32> = Channel::new();
        let count = Rc::new(Cell::new(0));
        let sub = {
            let count = Rc::clone(&count);
            channel.subscribe(move |_| count.set(count.get() + 1))
        };
        channel.notify(&1);
        drop(sub);
        channel.notify(&2);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_subscribe_during_notify_takes_effect_next_time() {
        let channel: Channel<u32> = Channel::new();
        let late_calls = Rc::new(Cell::new(0));
        let held = Rc::new(RefCell::new(Vec::new()));

        let _outer = {
            let channel = channel.clone();
            let late_calls = Rc::clone(&late_calls);
            let held = Rc::clone(&held);
            channel.clone().subscribe(move |_| {
                let late_calls = Rc::clone(&late_calls);
                let sub = channel.subscribe(move |_| late_calls.set(late_calls.get() + 1));
                held.borrow_mut().push(sub);
            })
        };

        channel.notify(&1);
        assert_eq!(late_calls.get(), 0);
        channel.notify(&2);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_subscription_outliving_channel_is_harmless() {
        let channel: Channel<u32> = Channel::new();
        let sub = channel.subscribe(|_| {});
        drop(channel);
        drop(sub);
        drop(Subscription::detached());
    }

    #[test]
    fn test_listeners_see_new_value_when_notified() {
        let active = ActiveChild::new(Rc::new(MemoryCell::with_value("old")));
        let observed = Rc::new(RefCell::new(Vec::new()));

        let subs: Vec<Subscription> = (0..3)
            .map(|_| {
                let reader = active.clone();
                let observed = Rc::clone(&observed);
                active.on_changed(move |change| {
                    observed
                        .borrow_mut()
                        .push((reader.get_selected(), change.child_id.clone()));
                })
            })
            .collect();

        active.select("new", Some("Bea"));

        let observed = observed.borrow();
        assert_eq!(observed.len(), 3);
        for (in_cell, in_event) in observed.iter() {
            assert_eq!(in_cell.as_deref(), Some("new"));
            assert_eq!(in_event.as_deref(), Some("new"));
        }
        drop(subs);
    }

    struct ReadOnlyCell;

    impl SelectionCell for ReadOnlyCell {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Ok(Some("stored".to_string()))
        }

        fn write(&self, _child_id: &str) -> Result<(), StorageError> {
            Err(StorageError::Operation("quota exceeded".to_string()))
        }

        fn remove(&self) -> Result<(), StorageError> {
            Err(StorageError::Operation("quota exceeded".to_string()))
        }
    }

    struct DisabledCell;

    impl SelectionCell for DisabledCell {
        fn read(&self) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn write(&self, _child_id: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn remove(&self) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }
    }

    fn observe(active: &ActiveChild) -> (Rc<RefCell<Vec<(Option<String>, bool)>>>, Subscription) {
        let observed = Rc::new(RefCell::new(Vec::new()));
        let sub = {
            let reader = active.clone();
            let observed = Rc::clone(&observed);
            active.on_changed(move |change| {
                let current = reader.get_selected();
                let stamp = FetchStamp::new(change.child_id.as_deref());
                observed
                    .borrow_mut()
                    .push((current.clone(), stamp.is_current(current.as_deref())));
            })
        };
        (observed, sub)
    }

    #[test]
    fn test_selection_works_without_storage() {
        let active = ActiveChild::new(Rc::new(DisabledCell));
        assert_eq!(active.get_selected(), None);
        let (observed, _sub) = observe(&active);

        active.select("c1", Some("Al"));
        active.clear();

        assert_eq!(
            observed.borrow().clone(),
            vec![(Some("c1".to_string()), true), (None, true)]
        );
    }

    #[test]
    fn test_rejected_write_does_not_expose_old_value() {
        let active = ActiveChild::new(Rc::new(ReadOnlyCell));
        assert_eq!(active.get_selected().as_deref(), Some("stored"));
        let (observed, _sub) = observe(&active);

        active.select("c2", None);

        assert_eq!(observed.borrow().clone(), vec![(Some("c2".to_string()), true)]);
        assert_eq!(active.get_selected().as_deref(), Some("c2"));
    }

    #[test]
    fn test_select_event_payload() {
        let active = ActiveChild::new(Rc::new(MemoryCell::new()));
        let last = Rc::new(RefCell::new(None));
        let _sub = {
            let last = Rc::clone(&last);
            active.on_changed(move |change| *last.borrow_mut() = Some(change.clone()))
        };

        active.select("c1", Some("Al"));
        assert_eq!(
            last.borrow().clone(),
            Some(SelectionChange {
                child_id: Some("c1".to_string()),
                name: Some("Al".to_string()),
                origin: ChangeOrigin::Local,
            })
        );

        active.clear();
        assert_eq!(active.get_selected(), None);
        assert_eq!(last.borrow().as_ref().and_then(|c| c.child_id.clone()), None);
    }

    #[test]
    fn test_external_change_filters_by_key() {
        let broadcaster = SelectionBroadcaster::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = Rc::clone(&seen);
            broadcaster.on_changed(move |change| seen.borrow_mut().push(change.clone()))
        };

        assert!(!broadcaster.notify_external(Some("theme"), Some("dark")));
        assert!(!broadcaster.notify_external(None, None));
        assert!(broadcaster.notify_external(Some(ACTIVE_CHILD_KEY), Some("c7")));
        assert!(broadcaster.notify_external(Some(ACTIVE_CHILD_KEY), None));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].child_id.as_deref(), Some("c7"));
        assert_eq!(seen[0].origin, ChangeOrigin::External);
        assert_eq!(seen[0].name, None);
        assert_eq!(seen[1].child_id, None);
    }
}
