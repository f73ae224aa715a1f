//! `localStorage`-backed token store

use gloo::storage::{LocalStorage, Storage};
use scm_http::TokenStore;

/// Keeps the bearer token in `localStorage` as a plain string
#[derive(Debug, Clone)]
pub struct LocalStorageTokenStore {
    key: String,
}

impl LocalStorageTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn token(&self) -> Option<String> {
        LocalStorage::raw()
            .get_item(&self.key)
            .ok()
            .flatten()
            .filter(|t| !t.is_empty())
    }

    fn set_token(&self, token: &str) {
        if let Err(e) = LocalStorage::raw().set_item(&self.key, token) {
            tracing::warn!(error = ?e, "Failed to persist token");
        }
    }

    fn clear_token(&self) {
        if let Err(e) = LocalStorage::raw().remove_item(&self.key) {
            tracing::warn!(error = ?e, "Failed to remove token");
        }
    }
}
