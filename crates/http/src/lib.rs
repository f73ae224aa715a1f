//! SCM portal HTTP client
//!
//! A typed client for the procurement backend. Base URL resolution lives in
//! `scm-core`; this crate adds the request/response handling around it and
//! thin wrappers for the REST resources.

pub mod client;
pub mod session;
pub mod types;

pub use client::error::ClientError;
pub use client::{ScmClient, ScmClientBuilder};
pub use session::{MemoryTokenStore, Navigator, NoopNavigator, TokenStore};

#[cfg(not(target_arch = "wasm32"))]
pub use session::FileTokenStore;
