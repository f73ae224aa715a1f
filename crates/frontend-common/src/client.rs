//! Client configuration and initialization

use crate::location::current_location;
use crate::navigation::WindowNavigator;
use crate::storage::LocalStorageTokenStore;
use once_cell::sync::Lazy;
use scm_core::ClientSettings;
pub use scm_http::ClientError;
use scm_http::ScmClient;
use std::sync::{Arc, Mutex, PoisonError};

/// Client shared by every page, created on first use
static SHARED_CLIENT: Lazy<Mutex<Option<ScmClient>>> = Lazy::new(|| Mutex::new(None));

/// Settings baked in at build time from `SCM_API_BASE` / `SCM_API_BASE_URL`
pub fn build_settings() -> ClientSettings {
    ClientSettings {
        api_base: option_env!("SCM_API_BASE").map(str::to_string),
        api_base_url: option_env!("SCM_API_BASE_URL").map(str::to_string),
        ..ClientSettings::default()
    }
}

/// Create a client wired to the page: origin from `window.location`, token
/// from `localStorage`, session expiry redirects through `window.location`
pub fn create_client(settings: &ClientSettings) -> Result<ScmClient, ClientError> {
    let base = settings.resolve(current_location().as_ref());

    ScmClient::builder()
        .base(base)
        .token_store(Arc::new(LocalStorageTokenStore::new(&settings.token_key)))
        .navigator(Arc::new(WindowNavigator))
        .login_route(settings.login_route.clone())
        .timeout(settings.timeout())
        .build()
}

/// Get the shared client instance
pub fn api_client() -> Result<ScmClient, ClientError> {
    let mut slot = SHARED_CLIENT.lock().unwrap_or_else(PoisonError::into_inner);

    if let Some(client) = slot.as_ref() {
        return Ok(client.clone());
    }

    let client = create_client(&build_settings())?;
    *slot = Some(client.clone());
    Ok(client)
}
