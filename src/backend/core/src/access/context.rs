//! Extra named parameters forwarded verbatim to every predicate.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::error::PredicateError;

/// Open-ended set of request-scoped values a predicate may consult.
///
/// The access layer never inspects these; it hands the same context to every
/// predicate of a single check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessContext {
    values: HashMap<String, Value>,
}

impl AccessContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Values that fail to serialize are skipped.
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(v) = serde_json::to_value(value) {
            self.values.insert(key.into(), v);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Decode a value into `T`, reporting a predicate failure on type mismatch.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PredicateError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| PredicateError::InvalidContext {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
