//! Devtools bridge: mirrors store activity to an external inspector.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::api::StockApi;
use crate::error::StockError;
use crate::observer_array::observer;
use crate::observers::BatchUpdate;
use crate::subscription::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StockedEvent {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "update")]
    BatchUpdate,
}

impl StockedEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockedEvent::New => "new",
            StockedEvent::BatchUpdate => "update",
        }
    }
}

/// Receiver of devtools events.
pub trait DevtoolsHook {
    fn raise_event(&self, event: StockedEvent, payload: Value);
}

/// Assigns ids to stores and forwards their activity to a [`DevtoolsHook`].
///
/// Read-only: the bridge never writes into a store.
pub struct DevtoolsBridge {
    hook: Rc<dyn DevtoolsHook>,
    next_id: Cell<u64>,
}

impl DevtoolsBridge {
    pub fn new(hook: Rc<dyn DevtoolsHook>) -> Self {
        Self {
            hook,
            next_id: Cell::new(0),
        }
    }

    /// Raises `new` with the current tree, then `update` for every batch
    /// update of `stock` until the returned subscription is released.
    pub fn register<S: StockApi>(&self, stock: &S) -> Result<Subscription, StockError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let values = stock.get_values()?;
        self.hook
            .raise_event(StockedEvent::New, json!({"data": &*values, "id": id}));

        let hook = Rc::clone(&self.hook);
        Ok(stock.watch_batch_updates(observer(move |update: &BatchUpdate| {
            match serde_json::to_value(update) {
                Ok(data) => hook.raise_event(StockedEvent::BatchUpdate, json!({"data": data, "id": id})),
                Err(error) => warn!(%error, id, "dropping devtools update"),
            }
        })))
    }
}
