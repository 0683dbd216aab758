//! The value store.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use stocked_path::{deep_get, deep_set, Pxth};
use tracing::{debug, trace};

use crate::api::StockApi;
use crate::config::StockConfig;
use crate::error::StockError;
use crate::observer_array::Observer;
use crate::observers::{BatchUpdate, ObserverDirectory};
use crate::set_state_action::SetStateAction;
use crate::subscription::Subscription;

struct StockState {
    initial_values: Value,
    values: RefCell<Rc<Value>>,
    observers: ObserverDirectory,
}

/// Holds the current value tree of one session and notifies observers on
/// every write.
///
/// `Stock` is a handle: clones share the same tree and observers. Every
/// write installs a new tree, so an `Rc<Value>` obtained from
/// [`Stock::get_values`] never changes afterwards.
#[derive(Clone)]
pub struct Stock {
    state: Rc<StockState>,
}

impl Stock {
    pub fn new(initial_values: Value) -> Self {
        let values = Rc::new(initial_values.clone());
        Self {
            state: Rc::new(StockState {
                initial_values,
                values: RefCell::new(values),
                observers: ObserverDirectory::new(),
            }),
        }
    }

    pub fn from_config(config: StockConfig) -> Self {
        Self::new(config.initial_values)
    }

    pub fn get_value(&self, path: &Pxth) -> Value {
        let values = self.get_values();
        deep_get(&values, path).cloned().unwrap_or(Value::Null)
    }

    /// Snapshot of the whole tree.
    pub fn get_values(&self) -> Rc<Value> {
        Rc::clone(&self.state.values.borrow())
    }

    /// Writes at `path`, then notifies every observer whose path contains,
    /// or is contained by, `path`.
    ///
    /// An updater receives the value currently stored at `path`.
    pub fn set_value(&self, path: &Pxth, action: impl Into<SetStateAction>) {
        let current = self.get_values();
        let value = match action.into() {
            SetStateAction::Value(value) => value,
            SetStateAction::Update(update) => update(deep_get(&current, path).unwrap_or(&Value::Null)),
        };
        let next = Rc::new(deep_set(&current, path, value));
        trace!(path = %path, "set value");
        self.replace_tree(Rc::clone(&next));
        self.state.observers.notify_sub_tree(path, next);
    }

    /// Replaces the whole tree and notifies every observer.
    pub fn set_values(&self, values: Value) {
        debug!("replacing all values");
        let next = Rc::new(values);
        self.replace_tree(Rc::clone(&next));
        self.state.observers.notify_all(next);
    }

    /// Restores the initial tree given at construction.
    pub fn reset_values(&self) {
        debug!("resetting values");
        self.set_values(self.state.initial_values.clone());
    }

    pub fn watch(&self, path: &Pxth, observer: Observer<Value>) -> Subscription {
        self.state.observers.watch(path.clone(), observer)
    }

    pub fn watch_all(&self, observer: Observer<Value>) -> Subscription {
        self.state.observers.watch_all(observer)
    }

    pub fn watch_batch_updates(&self, observer: Observer<BatchUpdate>) -> Subscription {
        self.state.observers.watch_batch_updates(observer)
    }

    pub fn is_observed(&self, path: &Pxth) -> bool {
        self.state.observers.is_observed(path)
    }

    pub fn observers(&self) -> &ObserverDirectory {
        &self.state.observers
    }

    fn replace_tree(&self, next: Rc<Value>) {
        *self.state.values.borrow_mut() = next;
    }
}

impl fmt::Debug for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stock")
            .field("values", &self.get_values())
            .finish_non_exhaustive()
    }
}

impl StockApi for Stock {
    fn get_value(&self, path: &Pxth) -> Result<Value, StockError> {
        Ok(Stock::get_value(self, path))
    }

    fn get_values(&self) -> Result<Rc<Value>, StockError> {
        Ok(Stock::get_values(self))
    }

    fn set_value(&self, path: &Pxth, action: SetStateAction) -> Result<(), StockError> {
        Stock::set_value(self, path, action);
        Ok(())
    }

    fn set_values(&self, values: Value) -> Result<(), StockError> {
        Stock::set_values(self, values);
        Ok(())
    }

    fn reset_values(&self) -> Result<(), StockError> {
        Stock::reset_values(self);
        Ok(())
    }

    fn watch(&self, path: &Pxth, observer: Observer<Value>) -> Result<Subscription, StockError> {
        Ok(Stock::watch(self, path, observer))
    }

    fn watch_batch_updates(&self, observer: Observer<BatchUpdate>) -> Subscription {
        Stock::watch_batch_updates(self, observer)
    }

    fn is_observed(&self, path: &Pxth) -> bool {
        Stock::is_observed(self, path)
    }
}
