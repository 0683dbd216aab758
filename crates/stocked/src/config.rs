//! Serializable construction parameters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stocked_path::Pxth;

use crate::error::StockError;
use crate::proxy::{MappingProxy, ProxyMapSource, StockProxy};

/// Parameters of [`crate::Stock::from_config`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockConfig {
    #[serde(default)]
    pub initial_values: Value,
}

impl StockConfig {
    pub fn new(initial_values: Value) -> Self {
        Self { initial_values }
    }
}

/// Declarative [`MappingProxy`]: attachment path plus a nested map whose
/// leaves are real paths in dotted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingProxyConfig {
    #[serde(default)]
    pub path: Pxth,
    pub map: Value,
}

impl MappingProxyConfig {
    /// Builds and activates the proxy.
    ///
    /// # Errors
    ///
    /// [`StockError::InvalidProxyMap`] or [`StockError::Path`] for a
    /// malformed `map`.
    pub fn into_proxy(self) -> Result<MappingProxy, StockError> {
        let source = ProxyMapSource::from_json(&self.map)?;
        let mut proxy = MappingProxy::new(&source, self.path);
        proxy.activate();
        Ok(proxy)
    }
}
