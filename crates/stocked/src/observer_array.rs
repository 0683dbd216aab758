use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::StockError;

/// Callback receiving messages of type `M`.
pub type Observer<M> = Rc<dyn Fn(&M)>;

/// Wraps a closure as an [`Observer`].
pub fn observer<M, F>(f: F) -> Observer<M>
where
    F: Fn(&M) + 'static,
{
    Rc::new(f)
}

/// Registration handle, issued in increasing order per [`ObserverArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverKey(u64);

impl fmt::Display for ObserverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observers of one channel, called in registration order.
pub struct ObserverArray<M> {
    next_key: u64,
    observers: BTreeMap<ObserverKey, Observer<M>>,
}

impl<M> Default for ObserverArray<M> {
    fn default() -> Self {
        Self {
            next_key: 0,
            observers: BTreeMap::new(),
        }
    }
}

impl<M> ObserverArray<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Observer<M>) -> ObserverKey {
        let key = ObserverKey(self.next_key);
        self.next_key = self.next_key.saturating_add(1);
        self.observers.insert(key, observer);
        key
    }

    /// # Errors
    ///
    /// Returns [`StockError::UnknownObserver`] if `key` is not registered
    /// (never was, or was already removed).
    pub fn remove(&mut self, key: ObserverKey) -> Result<(), StockError> {
        self.observers
            .remove(&key)
            .map(|_| ())
            .ok_or(StockError::UnknownObserver { key })
    }

    /// Calls every observer with `message`.
    pub fn call(&self, message: &M) {
        for observer in self.snapshot() {
            observer(message);
        }
    }

    /// Clones the current observer list, so it can be called after the
    /// array itself is no longer borrowed.
    pub fn snapshot(&self) -> Vec<Observer<M>> {
        self.observers.values().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }
}

impl<M> fmt::Debug for ObserverArray<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverArray")
            .field("keys", &self.observers.keys().collect::<Vec<_>>())
            .finish()
    }
}
