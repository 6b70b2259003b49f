//! Bearer token sources.
//!
//! `ApiClient` asks its `TokenProvider` for the token on every request and
//! never keeps a copy, so rotating the token takes effect on the next call.

use std::sync::{Arc, RwLock};

/// Supplies the current bearer token.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> String;
}

impl<F> TokenProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn token(&self) -> String {
        self()
    }
}

/// A token that never changes.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> String {
        self.0.clone()
    }
}

/// A shared, replaceable token. Clones observe each other's updates.
#[derive(Debug, Clone, Default)]
pub struct SharedToken {
    inner: Arc<RwLock<String>>,
}

impl SharedToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(token.into())),
        }
    }

    /// Replace the token seen by every clone of this handle.
    pub fn set(&self, token: impl Into<String>) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = token.into();
    }
}

impl TokenProvider for SharedToken {
    fn token(&self) -> String {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
