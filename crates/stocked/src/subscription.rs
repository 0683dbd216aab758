use std::fmt;

use crate::error::StockError;

type Dispose = Box<dyn FnOnce() -> Result<(), StockError>>;

/// Disposer returned by every `watch*` call.
///
/// Dropping a `Subscription` does not unsubscribe; call
/// [`Subscription::unsubscribe`]. Proxies wrap the subscription of the layer
/// beneath, so one `unsubscribe` releases the registration wherever it lives.
#[must_use = "dropping a Subscription keeps the observer registered"]
pub struct Subscription {
    dispose: Dispose,
}

impl Subscription {
    pub fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() -> Result<(), StockError> + 'static,
    {
        Self {
            dispose: Box::new(dispose),
        }
    }

    /// A subscription with nothing to release.
    pub fn noop() -> Self {
        Self::new(|| Ok(()))
    }

    /// Removes the observer this subscription was created for.
    pub fn unsubscribe(self) -> Result<(), StockError> {
        (self.dispose)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
