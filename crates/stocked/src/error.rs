use stocked_path::{Pxth, PxthError};
use thiserror::Error;

use crate::observer_array::ObserverKey;

/// Usage errors. None of these are transient: they point at a bug in the
/// caller and are never retried or papered over by the store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("cannot remove observer from \"{path}\", which is not observed")]
    NotObserved { path: Pxth },
    #[error("could not remove observer: observer with key {key} does not exist")]
    UnknownObserver { key: ObserverKey },
    #[error("cannot use proxy which is not activated; call activate() first")]
    ProxyNotActivated,
    #[error("cannot modify proxy after activation")]
    ProxyActivated,
    #[error("mapping proxy error: \"{path}\" is not defined in proxy map")]
    PathNotMapped { path: Pxth },
    #[error("mapping proxy error: no logical path maps exactly to \"{path}\"")]
    NoInverseMapping { path: Pxth },
    #[error("invalid proxy map: {0}")]
    InvalidProxyMap(String),
    #[error(transparent)]
    Path(#[from] PxthError),
}
