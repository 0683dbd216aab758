//! Routing of logical operations through an optional proxy.
//!
//! Operations at or below the proxy's attachment path go through the proxy;
//! everything else goes straight to the layer beneath. Since
//! [`ProxiedStock`] implements [`StockApi`] itself, proxied stores stack.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use stocked_path::{deep_get, deep_set, deep_set_in_place, deep_unset, Pxth};
use tracing::debug;

use crate::api::StockApi;
use crate::error::StockError;
use crate::observer_array::Observer;
use crate::observers::BatchUpdate;
use crate::proxy::StockProxy;
use crate::set_state_action::SetStateAction;
use crate::subscription::Subscription;

/// `true` when `path` is at or below the attachment path of `proxy`.
pub fn should_use_proxy(proxy: Option<&dyn StockProxy>, path: &Pxth) -> bool {
    proxy.is_some_and(|proxy| proxy.path().is_ancestor_or_same(path))
}

/// Runs `proxied` when `path` falls under `proxy`, `standard` otherwise.
pub fn intercept<T, S, P>(proxy: Option<&dyn StockProxy>, path: &Pxth, standard: S, proxied: P) -> T
where
    S: FnOnce() -> T,
    P: FnOnce(&dyn StockProxy) -> T,
{
    match proxy {
        Some(proxy) if proxy.path().is_ancestor_or_same(path) => proxied(proxy),
        _ => standard(),
    }
}

/// A [`StockApi`] layer that consults a proxy before the layer beneath.
#[derive(Clone)]
pub struct ProxiedStock<S> {
    inner: S,
    proxy: Option<Rc<dyn StockProxy>>,
}

impl<S: StockApi> ProxiedStock<S> {
    /// # Errors
    ///
    /// [`StockError::ProxyNotActivated`] if `proxy` has not been activated.
    pub fn new(inner: S, proxy: Option<Rc<dyn StockProxy>>) -> Result<Self, StockError> {
        if proxy.as_ref().is_some_and(|proxy| !proxy.is_active()) {
            return Err(StockError::ProxyNotActivated);
        }
        Ok(Self { inner, proxy })
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn proxy(&self) -> Option<&dyn StockProxy> {
        self.proxy.as_deref()
    }
}

impl<S: StockApi> StockApi for ProxiedStock<S> {
    fn get_value(&self, path: &Pxth) -> Result<Value, StockError> {
        let inner = &self.inner;
        intercept(
            self.proxy(),
            path,
            || inner.get_value(path),
            |proxy| proxy.get_value(path, &|real: &Pxth| inner.get_value(real)),
        )
    }

    /// The lower tree with the proxy's logical view placed at its attachment
    /// path.
    fn get_values(&self) -> Result<Rc<Value>, StockError> {
        let inner = &self.inner;
        let values = inner.get_values()?;
        let Some(proxy) = self.proxy() else {
            return Ok(values);
        };
        let proxied = proxy.get_value(proxy.path(), &|real: &Pxth| inner.get_value(real))?;
        Ok(Rc::new(deep_set(&values, proxy.path(), proxied)))
    }

    fn set_value(&self, path: &Pxth, action: SetStateAction) -> Result<(), StockError> {
        let inner = &self.inner;
        match self.proxy() {
            Some(proxy) if should_use_proxy(Some(proxy), path) => proxy.set_value(
                path,
                action,
                &mut |real: &Pxth, action: SetStateAction| inner.set_value(real, action),
                &|real: &Pxth| inner.get_value(real),
            ),
            _ => inner.set_value(path, action),
        }
    }

    /// Moves the part of `values` under the proxy's attachment path to the
    /// real paths it maps to, then replaces the lower tree in one call.
    fn set_values(&self, values: Value) -> Result<(), StockError> {
        let inner = &self.inner;
        let Some(proxy) = self.proxy() else {
            return inner.set_values(values);
        };

        let proxied = deep_get(&values, proxy.path()).cloned().unwrap_or(Value::Null);
        let mut remainder = if proxy.path().is_root() {
            (*inner.get_values()?).clone()
        } else {
            deep_unset(&values, proxy.path())
        };
        {
            let mut collect = |real: &Pxth, action: SetStateAction| -> Result<(), StockError> {
                let value = action.resolve(|| inner.get_value(real))?;
                deep_set_in_place(&mut remainder, real, value);
                Ok(())
            };
            proxy.set_value(
                proxy.path(),
                SetStateAction::Value(proxied),
                &mut collect,
                &|real: &Pxth| inner.get_value(real),
            )?;
        }
        debug!(path = %proxy.path(), "replacing values through proxy");
        inner.set_values(remainder)
    }

    fn reset_values(&self) -> Result<(), StockError> {
        self.inner.reset_values()
    }

    fn watch(&self, path: &Pxth, observer: Observer<Value>) -> Result<Subscription, StockError> {
        let inner = &self.inner;
        match self.proxy() {
            Some(proxy) if should_use_proxy(Some(proxy), path) => proxy.watch(
                path,
                observer,
                &|real: &Pxth, raw: Observer<Value>| inner.watch(real, raw),
            ),
            _ => inner.watch(path, observer),
        }
    }

    fn watch_batch_updates(&self, observer: Observer<BatchUpdate>) -> Subscription {
        self.inner.watch_batch_updates(observer)
    }

    fn is_observed(&self, path: &Pxth) -> bool {
        self.inner.is_observed(path)
    }
}

impl<S: fmt::Debug> fmt::Debug for ProxiedStock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxiedStock")
            .field("inner", &self.inner)
            .field("proxy_path", &self.proxy.as_ref().map(|proxy| proxy.path().clone()))
            .finish()
    }
}
