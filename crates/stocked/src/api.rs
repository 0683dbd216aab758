use std::rc::Rc;

use serde_json::Value;
use stocked_path::Pxth;

use crate::error::StockError;
use crate::observer_array::Observer;
use crate::observers::BatchUpdate;
use crate::set_state_action::SetStateAction;
use crate::subscription::Subscription;

/// Logical read/write/watch interface.
///
/// Implemented by [`crate::Stock`] and by [`crate::ProxiedStock`], which wraps
/// another implementation; this is what binding layers talk to, and what
/// lets proxies stack.
pub trait StockApi {
    /// Sub-value at `path` (`null` when absent; the whole tree for the root).
    fn get_value(&self, path: &Pxth) -> Result<Value, StockError>;

    fn get_values(&self) -> Result<Rc<Value>, StockError>;

    fn set_value(&self, path: &Pxth, action: SetStateAction) -> Result<(), StockError>;

    fn set_values(&self, values: Value) -> Result<(), StockError>;

    fn reset_values(&self) -> Result<(), StockError>;

    fn watch(&self, path: &Pxth, observer: Observer<Value>) -> Result<Subscription, StockError>;

    fn watch_all(&self, observer: Observer<Value>) -> Result<Subscription, StockError> {
        self.watch(&Pxth::root(), observer)
    }

    fn watch_batch_updates(&self, observer: Observer<BatchUpdate>) -> Subscription;

    fn is_observed(&self, path: &Pxth) -> bool;
}
