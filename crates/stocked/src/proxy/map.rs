//! Logical-to-real path tables.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde_json::Value;
use stocked_path::{Pxth, Segment};

use crate::error::StockError;

/// Nested description of a mapping: the shape of the logical value, with a
/// real path at every leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyMapSource {
    Path(Pxth),
    Object(IndexMap<String, ProxyMapSource>),
    Array(Vec<ProxyMapSource>),
}

impl ProxyMapSource {
    pub fn path(path: Pxth) -> Self {
        ProxyMapSource::Path(path)
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ProxyMapSource)>,
        K: Into<String>,
    {
        ProxyMapSource::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = ProxyMapSource>,
    {
        ProxyMapSource::Array(items.into_iter().collect())
    }

    /// Reads a source from JSON: strings are real paths (dotted form),
    /// objects and arrays nest.
    ///
    /// # Errors
    ///
    /// [`StockError::InvalidProxyMap`] for any other leaf, or
    /// [`StockError::Path`] for an unparsable path string.
    pub fn from_json(value: &Value) -> Result<Self, StockError> {
        match value {
            Value::String(text) => Ok(ProxyMapSource::Path(Pxth::parse(text)?)),
            Value::Object(map) => map
                .iter()
                .map(|(key, child)| Ok((key.clone(), Self::from_json(child)?)))
                .collect::<Result<IndexMap<_, _>, StockError>>()
                .map(ProxyMapSource::Object),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, StockError>>()
                .map(ProxyMapSource::Array),
            other => Err(StockError::InvalidProxyMap(format!(
                "expected a path string, object or array, found {other}"
            ))),
        }
    }
}

/// Flat table from logical path (relative to the proxy attachment) to real
/// path.
///
/// Equality ignores entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyMap {
    entries: IndexMap<Pxth, Pxth>,
}

impl ProxyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattens `source`, breadth first. A top-level path leaf maps the root.
    pub fn from_source(source: &ProxyMapSource) -> Self {
        let mut map = ProxyMap::new();
        let mut queue = VecDeque::from([(Pxth::root(), source)]);
        while let Some((prefix, node)) = queue.pop_front() {
            match node {
                ProxyMapSource::Path(real) => {
                    map.insert(prefix, real.clone());
                }
                ProxyMapSource::Object(children) => {
                    for (key, child) in children {
                        queue.push_back((prefix.child(Segment::from(key.as_str())), child));
                    }
                }
                ProxyMapSource::Array(items) => {
                    for (index, child) in items.iter().enumerate() {
                        queue.push_back((prefix.child(index), child));
                    }
                }
            }
        }
        map
    }

    pub fn insert(&mut self, logical: Pxth, real: Pxth) -> Option<Pxth> {
        self.entries.insert(logical, real)
    }

    pub fn get(&self, logical: &Pxth) -> Option<&Pxth> {
        self.entries.get(logical)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pxth, &Pxth)> {
        self.entries.iter()
    }

    /// Entries whose logical path lies strictly below `logical`.
    pub fn entries_under<'a>(&'a self, logical: &'a Pxth) -> impl Iterator<Item = (&'a Pxth, &'a Pxth)> {
        self.entries.iter().filter(move |(key, _)| logical.is_ancestor_of(key))
    }

    /// The deepest entry whose logical path is a strict ancestor of `logical`.
    pub fn mapped_ancestor(&self, logical: &Pxth) -> Option<(&Pxth, &Pxth)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.is_ancestor_of(logical))
            .max_by_key(|(key, _)| key.len())
    }

    /// Logical path whose real path is exactly `real`.
    pub fn find_logical(&self, real: &Pxth) -> Option<&Pxth> {
        self.entries
            .iter()
            .find_map(|(logical, target)| (target == real).then_some(logical))
    }
}

impl FromIterator<(Pxth, Pxth)> for ProxyMap {
    fn from_iter<I: IntoIterator<Item = (Pxth, Pxth)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
