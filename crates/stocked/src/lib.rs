//! Reactive value store addressed by hierarchical paths.
//!
//! A [`Stock`] holds one tree of `serde_json::Value`s. Callers read and write
//! at any [`Pxth`] and subscribe to exactly the positions they care about: a
//! write notifies the observers registered at the written path, above it and
//! below it, and nobody else. A [`MappingProxy`] mounted through
//! [`ProxiedStock`] presents a different logical schema over the same tree.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use serde_json::{json, Value};
//! use stocked::{observer, Pxth, Stock};
//!
//! let stock = Stock::new(json!({"user": {"name": "Ann"}}));
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let subscription = stock.watch(
//!     &Pxth::parse("user").unwrap(),
//!     observer(move |user: &Value| sink.borrow_mut().push(user.clone())),
//! );
//!
//! stock.set_value(&Pxth::parse("user.name").unwrap(), json!("Bob"));
//! assert_eq!(*seen.borrow(), vec![json!({"name": "Bob"})]);
//! subscription.unsubscribe().unwrap();
//! ```

pub mod api;
pub mod config;
pub mod debug;
pub mod error;
pub mod intercept;
pub mod observer_array;
pub mod observers;
pub mod proxy;
pub mod set_state_action;
pub mod stock;
pub mod subscription;

pub use api::StockApi;
pub use config::{MappingProxyConfig, StockConfig};
pub use debug::{DevtoolsBridge, DevtoolsHook, StockedEvent};
pub use error::StockError;
pub use intercept::{intercept, should_use_proxy, ProxiedStock};
pub use observer_array::{observer, Observer, ObserverArray, ObserverKey};
pub use observers::{BatchUpdate, Notification, ObserverDirectory, Observers};
pub use proxy::{MappingKind, MappingProxy, ProxyMap, ProxyMapSource, ProxyState, Resolution, StockProxy};
pub use set_state_action::SetStateAction;
pub use stock::Stock;
pub use stocked_path::{Pxth, PxthError, Segment};
pub use subscription::Subscription;

/// Crate version, as recorded in `Cargo.toml`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
