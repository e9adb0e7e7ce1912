//! Environment lookup
//!
//! Resolution never touches `std::env` directly; it goes through
//! [`EnvLookup`] so hosts and tests can supply their own view.

use std::collections::HashMap;

/// Read-only view of environment variables.
pub trait EnvLookup {
    /// Raw value of `key`, if present.
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key` when present and non-empty, otherwise `default`.
    fn get_or(&self, key: &str, default: &str) -> String {
        match self.var(key) {
            Some(v) if !v.is_empty() => v,
            _ => default.to_string(),
        }
    }

    /// Whether `key` is present with a non-empty value.
    fn is_set(&self, key: &str) -> bool {
        self.var(key).is_some_and(|v| !v.is_empty())
    }
}

/// The process environment, read on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvLookup for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<E: EnvLookup + ?Sized> EnvLookup for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
