//! Path-remapping proxies.
//!
//! A proxy is attached at a logical path and translates reads, writes and
//! subscriptions at or below that path into operations on the layer beneath.
//! The layer beneath is handed in as plain functions, so a proxy never knows
//! whether it talks to a [`crate::Stock`] or to another proxied store.

use serde_json::Value;
use stocked_path::Pxth;

use crate::error::StockError;
use crate::observer_array::Observer;
use crate::set_state_action::SetStateAction;
use crate::subscription::Subscription;

pub mod map;
pub mod mapping;

pub use map::{ProxyMap, ProxyMapSource};
pub use mapping::{MappingKind, MappingProxy, Resolution};

/// Read from the layer beneath.
pub type DefaultGetValue<'a> = &'a dyn Fn(&Pxth) -> Result<Value, StockError>;
/// Write to the layer beneath.
pub type DefaultSetValue<'a> = &'a mut dyn FnMut(&Pxth, SetStateAction) -> Result<(), StockError>;
/// Subscribe on the layer beneath.
pub type DefaultWatch<'a> = &'a dyn Fn(&Pxth, Observer<Value>) -> Result<Subscription, StockError>;

/// Lifecycle of a proxy: configured first, then frozen by activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProxyState {
    #[default]
    Unactivated,
    Active,
}

impl ProxyState {
    /// Fails unless the proxy has been activated.
    pub fn ensure_active(self) -> Result<(), StockError> {
        match self {
            ProxyState::Active => Ok(()),
            ProxyState::Unactivated => Err(StockError::ProxyNotActivated),
        }
    }

    /// Fails once the proxy has been activated.
    pub fn ensure_mutable(self) -> Result<(), StockError> {
        match self {
            ProxyState::Unactivated => Ok(()),
            ProxyState::Active => Err(StockError::ProxyActivated),
        }
    }
}

/// A translation layer between logical and real paths.
///
/// All translating operations fail with [`StockError::ProxyNotActivated`]
/// until [`StockProxy::activate`] has been called.
pub trait StockProxy {
    /// Logical path the proxy is attached at.
    fn path(&self) -> &Pxth;

    fn is_active(&self) -> bool;

    /// Freezes the configuration. Idempotent.
    fn activate(&mut self);

    /// Real path holding the data for logical `path`.
    fn get_normal_path(&self, path: &Pxth) -> Result<Pxth, StockError>;

    /// Logical path for real `path`.
    fn get_proxied_path(&self, path: &Pxth) -> Result<Pxth, StockError>;

    fn get_value(&self, path: &Pxth, default_get_value: DefaultGetValue<'_>) -> Result<Value, StockError>;

    /// Writes at logical `path`. An updater is resolved against the logical
    /// value read through `default_get_value`.
    fn set_value(
        &self,
        path: &Pxth,
        action: SetStateAction,
        default_set_value: DefaultSetValue<'_>,
        default_get_value: DefaultGetValue<'_>,
    ) -> Result<(), StockError>;

    /// Subscribes at logical `path`; `observer` receives logical values.
    fn watch(
        &self,
        path: &Pxth,
        observer: Observer<Value>,
        default_watch: DefaultWatch<'_>,
    ) -> Result<Subscription, StockError>;
}
