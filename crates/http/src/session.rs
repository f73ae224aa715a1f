//! Session capabilities injected into the client
//!
//! The client never reads global storage or touches page state directly. It
//! asks a [`TokenStore`] for the bearer token and tells a [`Navigator`] where
//! to send the user when the session expires.

use std::sync::RwLock;

/// Persistent home of the bearer token
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    /// The stored token, if any
    fn token(&self) -> Option<String>;

    /// Store a new token
    fn set_token(&self, token: &str);

    /// Forget the stored token
    fn clear_token(&self);
}

/// Moves the user to another route
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, route: &str) {
        self(route);
    }
}

/// Navigator that only logs, for headless callers
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, route: &str) {
        tracing::debug!(route, "Navigation requested without a navigator");
    }
}

/// Token store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set_token(&self, token: &str) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.to_string());
        }
    }

    fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileTokenStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use super::TokenStore;
    use serde_json::{Map, Value};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Token store backed by a JSON file of `key -> token` entries
    #[derive(Debug)]
    pub struct FileTokenStore {
        path: PathBuf,
        key: String,
        lock: Mutex<()>,
    }

    impl FileTokenStore {
        pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
            Self {
                path: path.into(),
                key: key.into(),
                lock: Mutex::new(()),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn read_entries(&self) -> Map<String, Value> {
            match fs::read_to_string(&self.path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Ignoring unreadable token file"
                    );
                    Map::new()
                }),
                Err(_) => Map::new(),
            }
        }

        fn write_entries(&self, entries: &Map<String, Value>) {
            let result = (|| -> std::io::Result<()> {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let contents = serde_json::to_string_pretty(entries)?;
                fs::write(&self.path, contents)
            })();

            if let Err(e) = result {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to write token file"
                );
            }
        }
    }

    impl TokenStore for FileTokenStore {
        fn token(&self) -> Option<String> {
            let _guard = self.lock.lock().ok()?;
            self.read_entries()
                .get(&self.key)
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        }

        fn set_token(&self, token: &str) {
            let Ok(_guard) = self.lock.lock() else {
                return;
            };
            let mut entries = self.read_entries();
            entries.insert(self.key.clone(), Value::String(token.to_string()));
            self.write_entries(&entries);
        }

        fn clear_token(&self) {
            let Ok(_guard) = self.lock.lock() else {
                return;
            };
            let mut entries = self.read_entries();
            if entries.remove(&self.key).is_some() {
                self.write_entries(&entries);
            }
        }
    }
}
