//! Path-keyed observer directory.
//!
//! A write at path `m` notifies every registered path `p` such that `p`
//! contains `m` or `m` contains `p`: a watcher of `parent` sees writes to
//! `parent.child.value`, and a watcher of `parent.child.value` sees a write
//! replacing `parent`. Each watcher receives its own sub-value. After the
//! per-path callbacks, one [`BatchUpdate`] summarizing the mutation goes to
//! the batch channel.
//!
//! Callbacks are collected before the first one runs, so an observer that
//! unsubscribes (itself or another one) during a fan-out does not change who
//! receives the notification in progress; the change applies to the next one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use stocked_path::{deep_get, Pxth};
use tracing::trace;

use crate::error::StockError;
use crate::observer_array::{Observer, ObserverArray, ObserverKey};
use crate::subscription::Subscription;

static NULL: Value = Value::Null;

/// Summary of one mutation, delivered once per `set_value`/`set_values`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchUpdate {
    /// Where the write happened (root for whole-tree replacement).
    pub origin: Pxth,
    /// Registered paths that were notified, in registration order.
    pub paths: Vec<Pxth>,
    /// The whole tree after the mutation.
    pub values: Rc<Value>,
}

/// Registry of path observers and batch observers.
#[derive(Debug, Default)]
pub struct Observers {
    entries: IndexMap<Pxth, ObserverArray<Value>>,
    batch: ObserverArray<BatchUpdate>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, path: Pxth, observer: Observer<Value>) -> ObserverKey {
        self.entries.entry(path).or_default().add(observer)
    }

    /// # Errors
    ///
    /// - [`StockError::NotObserved`] if nothing is registered at `path`;
    /// - [`StockError::UnknownObserver`] if `key` is not registered there.
    pub fn stop_observing(&mut self, path: &Pxth, key: ObserverKey) -> Result<(), StockError> {
        let observers = self
            .entries
            .get_mut(path)
            .ok_or_else(|| StockError::NotObserved { path: path.clone() })?;
        observers.remove(key)?;
        if observers.is_empty() {
            self.entries.shift_remove(path);
        }
        Ok(())
    }

    pub fn observe_batch_updates(&mut self, observer: Observer<BatchUpdate>) -> ObserverKey {
        self.batch.add(observer)
    }

    pub fn stop_observing_batch_updates(&mut self, key: ObserverKey) -> Result<(), StockError> {
        self.batch.remove(key)
    }

    /// `true` iff at least one observer is registered at exactly `path`.
    pub fn is_observed(&self, path: &Pxth) -> bool {
        self.entries.contains_key(path)
    }

    /// Registered paths, in registration order.
    pub fn paths(&self) -> impl Iterator<Item = &Pxth> {
        self.entries.keys()
    }

    /// Collects the observers affected by a write at `origin`.
    pub fn plan_sub_tree(&self, origin: &Pxth) -> Notification {
        let targets = self
            .entries
            .iter()
            .filter(|(path, _)| path.is_related(origin))
            .map(|(path, observers)| (path.clone(), observers.snapshot()))
            .collect();
        Notification {
            origin: origin.clone(),
            targets,
            batch: self.batch.snapshot(),
        }
    }

    /// Collects every registered observer (whole-tree replacement).
    pub fn plan_all(&self) -> Notification {
        let targets = self
            .entries
            .iter()
            .map(|(path, observers)| (path.clone(), observers.snapshot()))
            .collect();
        Notification {
            origin: Pxth::root(),
            targets,
            batch: self.batch.snapshot(),
        }
    }
}

/// Observers captured for one mutation, ready to be called.
pub struct Notification {
    origin: Pxth,
    targets: Vec<(Pxth, Vec<Observer<Value>>)>,
    batch: Vec<Observer<BatchUpdate>>,
}

impl Notification {
    pub fn origin(&self) -> &Pxth {
        &self.origin
    }

    /// The containment set: registered paths this notification reaches.
    pub fn paths(&self) -> Vec<Pxth> {
        self.targets.iter().map(|(path, _)| path.clone()).collect()
    }

    /// Calls every path observer with its sub-value of `values`, then every
    /// batch observer with the summary. Returns the summary.
    pub fn dispatch(self, values: Rc<Value>) -> BatchUpdate {
        trace!(
            origin = %self.origin,
            affected = self.targets.len(),
            batch_observers = self.batch.len(),
            "dispatching notification"
        );
        let mut paths = Vec::with_capacity(self.targets.len());
        for (path, observers) in self.targets {
            let sub_value = deep_get(&values, &path).unwrap_or(&NULL);
            for observer in &observers {
                observer(sub_value);
            }
            paths.push(path);
        }
        let update = BatchUpdate {
            origin: self.origin,
            paths,
            values,
        };
        for observer in &self.batch {
            observer(&update);
        }
        update
    }
}

/// Shared handle to an [`Observers`] registry with disposer-returning
/// `watch*` operations.
#[derive(Debug, Clone, Default)]
pub struct ObserverDirectory {
    inner: Rc<RefCell<Observers>>,
}

impl ObserverDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer` at `path`.
    pub fn watch(&self, path: Pxth, observer: Observer<Value>) -> Subscription {
        let key = self.inner.borrow_mut().observe(path.clone(), observer);
        let registry = Rc::downgrade(&self.inner);
        Subscription::new(move || release(&registry, |observers| observers.stop_observing(&path, key)))
    }

    /// Registers `observer` at the root path.
    pub fn watch_all(&self, observer: Observer<Value>) -> Subscription {
        self.watch(Pxth::root(), observer)
    }

    pub fn watch_batch_updates(&self, observer: Observer<BatchUpdate>) -> Subscription {
        let key = self.inner.borrow_mut().observe_batch_updates(observer);
        let registry = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            release(&registry, |observers| observers.stop_observing_batch_updates(key))
        })
    }

    pub fn observe(&self, path: Pxth, observer: Observer<Value>) -> ObserverKey {
        self.inner.borrow_mut().observe(path, observer)
    }

    pub fn stop_observing(&self, path: &Pxth, key: ObserverKey) -> Result<(), StockError> {
        self.inner.borrow_mut().stop_observing(path, key)
    }

    pub fn is_observed(&self, path: &Pxth) -> bool {
        self.inner.borrow().is_observed(path)
    }

    pub fn notify_sub_tree(&self, path: &Pxth, values: Rc<Value>) -> BatchUpdate {
        let notification = self.inner.borrow().plan_sub_tree(path);
        notification.dispatch(values)
    }

    pub fn notify_all(&self, values: Rc<Value>) -> BatchUpdate {
        let notification = self.inner.borrow().plan_all();
        notification.dispatch(values)
    }
}

/// Runs a removal against the registry if it is still alive; a registry that
/// is gone has nothing left to remove.
fn release<F>(registry: &Weak<RefCell<Observers>>, remove: F) -> Result<(), StockError>
where
    F: FnOnce(&mut Observers) -> Result<(), StockError>,
{
    let Some(registry) = registry.upgrade() else {
        return Ok(());
    };
    let mut observers = registry.borrow_mut();
    remove(&mut observers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer_array::observer;
    use serde_json::json;
    use std::cell::Cell;

    fn p(text: &str) -> Pxth {
        Pxth::parse(text).unwrap()
    }

    fn counter() -> (Rc<Cell<usize>>, Observer<Value>) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, observer(move |_: &Value| inner.set(inner.get() + 1)))
    }

    #[test]
    fn test_plan_collects_both_directions() {
        let mut observers = Observers::new();
        for path in ["parent", "parent.child", "parent.child.value", "parent.other", "value"] {
            observers.observe(p(path), observer(|_| {}));
        }
        let plan = observers.plan_sub_tree(&p("parent.child"));
        assert_eq!(
            plan.paths(),
            vec![p("parent"), p("parent.child"), p("parent.child.value")]
        );
    }

    #[test]
    fn test_stop_observing_drops_empty_entry() {
        let mut observers = Observers::new();
        let key = observers.observe(p("value"), observer(|_| {}));
        assert!(observers.is_observed(&p("value")));
        observers.stop_observing(&p("value"), key).unwrap();
        assert!(!observers.is_observed(&p("value")));
        assert_eq!(
            observers.stop_observing(&p("value"), key),
            Err(StockError::NotObserved { path: p("value") })
        );
    }

    #[test]
    fn test_stop_observing_unknown_key_on_observed_path() {
        let mut observers = Observers::new();
        let first = observers.observe(p("value"), observer(|_| {}));
        let second = observers.observe(p("value"), observer(|_| {}));
        observers.stop_observing(&p("value"), first).unwrap();
        assert_eq!(
            observers.stop_observing(&p("value"), first),
            Err(StockError::UnknownObserver { key: first })
        );
        assert!(observers.is_observed(&p("value")));
        observers.stop_observing(&p("value"), second).unwrap();
    }

    #[test]
    fn test_unsubscribe_during_fan_out_keeps_current_round() {
        let directory = ObserverDirectory::new();
        let (count, counting) = counter();
        let held: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&held);
        let _killer = directory.watch(
            p("a"),
            observer(move |_| {
                if let Some(subscription) = slot.borrow_mut().take() {
                    subscription.unsubscribe().unwrap();
                }
            }),
        );
        *held.borrow_mut() = Some(directory.watch(p("a"), counting));

        directory.notify_sub_tree(&p("a"), Rc::new(json!({"a": 1})));
        assert_eq!(count.get(), 1);
        directory.notify_sub_tree(&p("a"), Rc::new(json!({"a": 2})));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_dispose_after_directory_dropped_is_noop() {
        let directory = ObserverDirectory::new();
        let subscription = directory.watch(p("a"), observer(|_| {}));
        drop(directory);
        assert_eq!(subscription.unsubscribe(), Ok(()));
    }
}
