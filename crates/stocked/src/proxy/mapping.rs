//! Proxy translating paths through a [`ProxyMap`].
//!
//! A logical path resolves in one of three ways, relative to the attachment
//! path:
//!
//! - exact: it is a key of the map, and reads/writes go to its real path;
//! - composite: map keys lie below it, so its value is assembled from (and
//!   written back to) several real leaves, rooted at their longest common
//!   real prefix;
//! - drill-through: it lies below a map key, so it addresses the inside of
//!   that key's real value.

use std::rc::Rc;

use serde_json::Value;
use stocked_path::{deep_get, deep_set_in_place, longest_common_path, Pxth};
use tracing::debug;

use super::map::{ProxyMap, ProxyMapSource};
use super::{DefaultGetValue, DefaultSetValue, DefaultWatch, ProxyState, StockProxy};
use crate::error::StockError;
use crate::observer_array::{observer, Observer};
use crate::set_state_action::SetStateAction;
use crate::subscription::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    Exact,
    Composite,
    DrillThrough,
}

/// Outcome of translating one logical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Logical path relative to the attachment point.
    pub relative: Pxth,
    /// Real path to read, write or watch.
    pub normal: Pxth,
    pub kind: MappingKind,
}

#[derive(Debug, Clone)]
pub struct MappingProxy {
    path: Pxth,
    map: Rc<ProxyMap>,
    state: ProxyState,
}

impl MappingProxy {
    pub fn new(source: &ProxyMapSource, path: Pxth) -> Self {
        Self::from_map(ProxyMap::from_source(source), path)
    }

    pub fn from_map(map: ProxyMap, path: Pxth) -> Self {
        Self {
            path,
            map: Rc::new(map),
            state: ProxyState::Unactivated,
        }
    }

    pub fn map(&self) -> &ProxyMap {
        &self.map
    }

    pub fn set_path(&mut self, path: Pxth) -> Result<(), StockError> {
        self.state.ensure_mutable()?;
        self.path = path;
        Ok(())
    }

    pub fn insert_mapping(&mut self, logical: Pxth, real: Pxth) -> Result<(), StockError> {
        self.state.ensure_mutable()?;
        Rc::make_mut(&mut self.map).insert(logical, real);
        Ok(())
    }

    /// Translates a logical path.
    ///
    /// # Errors
    ///
    /// - [`StockError::ProxyNotActivated`] before activation;
    /// - [`StockError::Path`] if `path` is not at or below the attachment;
    /// - [`StockError::PathNotMapped`] if no map entry covers `path`.
    pub fn resolve(&self, path: &Pxth) -> Result<Resolution, StockError> {
        self.state.ensure_active()?;
        let relative = path.relative_to(&self.path)?;

        if let Some(real) = self.map.get(&relative) {
            return Ok(Resolution {
                normal: real.clone(),
                relative,
                kind: MappingKind::Exact,
            });
        }

        let leaves: Vec<&Pxth> = self.map.entries_under(&relative).map(|(_, real)| real).collect();
        if !leaves.is_empty() {
            return Ok(Resolution {
                normal: longest_common_path(leaves),
                relative,
                kind: MappingKind::Composite,
            });
        }

        if let Some((key, real)) = self.map.mapped_ancestor(&relative) {
            let inside = relative.relative_to(key)?;
            return Ok(Resolution {
                normal: real.join(&inside),
                relative,
                kind: MappingKind::DrillThrough,
            });
        }

        Err(StockError::PathNotMapped { path: path.clone() })
    }
}

/// Builds the logical value for `resolution` out of the raw value read at
/// `resolution.normal`.
fn map_value(map: &ProxyMap, resolution: &Resolution, raw: &Value) -> Value {
    if resolution.kind != MappingKind::Composite {
        return raw.clone();
    }
    let mut result = Value::Null;
    for (key, real) in map.entries_under(&resolution.relative) {
        let (Ok(target), Ok(source)) = (
            key.relative_to(&resolution.relative),
            real.relative_to(&resolution.normal),
        ) else {
            continue;
        };
        let piece = deep_get(raw, &source).cloned().unwrap_or(Value::Null);
        deep_set_in_place(&mut result, &target, piece);
    }
    result
}

impl StockProxy for MappingProxy {
    fn path(&self) -> &Pxth {
        &self.path
    }

    fn is_active(&self) -> bool {
        self.state == ProxyState::Active
    }

    fn activate(&mut self) {
        if self.state != ProxyState::Active {
            debug!(path = %self.path, entries = self.map.len(), "activating mapping proxy");
            self.state = ProxyState::Active;
        }
    }

    fn get_normal_path(&self, path: &Pxth) -> Result<Pxth, StockError> {
        Ok(self.resolve(path)?.normal)
    }

    fn get_proxied_path(&self, path: &Pxth) -> Result<Pxth, StockError> {
        self.state.ensure_active()?;
        self.map
            .find_logical(path)
            .map(|logical| self.path.join(logical))
            .ok_or_else(|| StockError::NoInverseMapping { path: path.clone() })
    }

    fn get_value(&self, path: &Pxth, default_get_value: DefaultGetValue<'_>) -> Result<Value, StockError> {
        let resolution = self.resolve(path)?;
        let raw = default_get_value(&resolution.normal)?;
        Ok(map_value(&self.map, &resolution, &raw))
    }

    fn set_value(
        &self,
        path: &Pxth,
        action: SetStateAction,
        default_set_value: DefaultSetValue<'_>,
        default_get_value: DefaultGetValue<'_>,
    ) -> Result<(), StockError> {
        let resolution = self.resolve(path)?;
        if resolution.kind != MappingKind::Composite {
            return default_set_value(&resolution.normal, action);
        }

        let value = action.resolve(|| self.get_value(path, default_get_value))?;
        let mut writes: Vec<(&Pxth, &Pxth)> = self.map.entries_under(&resolution.relative).collect();
        writes.sort_by_key(|(key, _)| key.len());
        debug!(path = %path, writes = writes.len(), "decomposing composite write");
        for (key, real) in writes {
            let slice = deep_get(&value, &key.relative_to(&resolution.relative)?)
                .cloned()
                .unwrap_or(Value::Null);
            default_set_value(real, SetStateAction::Value(slice))?;
        }
        Ok(())
    }

    fn watch(
        &self,
        path: &Pxth,
        observer_fn: Observer<Value>,
        default_watch: DefaultWatch<'_>,
    ) -> Result<Subscription, StockError> {
        let resolution = self.resolve(path)?;
        let map = Rc::clone(&self.map);
        let normal = resolution.normal.clone();
        let raw_observer = observer(move |raw: &Value| observer_fn(&map_value(&map, &resolution, raw)));
        default_watch(&normal, raw_observer)
    }
}
