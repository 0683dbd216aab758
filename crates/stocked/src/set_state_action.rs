use std::fmt;

use serde_json::Value;

use crate::error::StockError;

/// What to write: a literal value, or a function of the current value.
pub enum SetStateAction {
    Value(Value),
    Update(Box<dyn FnOnce(&Value) -> Value>),
}

impl SetStateAction {
    pub fn update<F>(f: F) -> Self
    where
        F: FnOnce(&Value) -> Value + 'static,
    {
        SetStateAction::Update(Box::new(f))
    }

    /// Produces the value to write. `current` is only read for updaters.
    pub fn resolve<F>(self, current: F) -> Result<Value, StockError>
    where
        F: FnOnce() -> Result<Value, StockError>,
    {
        match self {
            SetStateAction::Value(value) => Ok(value),
            SetStateAction::Update(update) => Ok(update(&current()?)),
        }
    }
}

impl From<Value> for SetStateAction {
    fn from(value: Value) -> Self {
        SetStateAction::Value(value)
    }
}

impl fmt::Debug for SetStateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetStateAction::Value(value) => f.debug_tuple("Value").field(value).finish(),
            SetStateAction::Update(_) => f.write_str("Update(..)"),
        }
    }
}
