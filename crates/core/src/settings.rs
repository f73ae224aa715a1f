//! Client settings
//!
//! Loaded from built-in defaults, an optional TOML file and `SCM_`-prefixed
//! environment variables, later sources overriding earlier ones.

use crate::base::{BaseConfiguration, DEFAULT_LOCAL_BACKEND_PORT, ResolveOptions, ResolverPolicy};
use crate::error::CoreResult;
use crate::location::BrowserLocation;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Request timeout applied to every call unless overridden
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Storage key the bearer token lives under
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Route the user is sent to when the session expires
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

const ENV_PREFIX: &str = "SCM";

/// Settings shared by every client front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Absolute backend URL or relative path prefix (`SCM_API_BASE`)
    pub api_base: Option<String>,

    /// Legacy name for `api_base` (`SCM_API_BASE_URL`)
    pub api_base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Key the bearer token is persisted under
    pub token_key: String,

    /// Route to navigate to on an expired session
    pub login_route: String,

    /// Backend port used when the page is served from a development host
    pub local_backend_port: u16,

    /// How `api_base` is interpreted
    pub policy: ResolverPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: None,
            api_base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            local_backend_port: DEFAULT_LOCAL_BACKEND_PORT,
            policy: ResolverPolicy::default(),
        }
    }
}

impl ClientSettings {
    /// Load from defaults, an optional file and the process environment
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as [`ClientSettings::load`] with an explicit environment map in
    /// place of the process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> CoreResult<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        );

        let settings: Self = builder.build()?.try_deserialize()?;
        tracing::debug!(?settings, "Loaded client settings");
        Ok(settings)
    }

    /// The configured base string: `api_base` if present at all, else the
    /// legacy `api_base_url`. A present-but-empty value still wins and means
    /// "not configured".
    pub fn configured_base(&self) -> Option<&str> {
        self.api_base.as_deref().or(self.api_base_url.as_deref())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            policy: self.policy,
            local_backend_port: self.local_backend_port,
        }
    }

    /// Resolve the base configuration against an optional page location
    pub fn resolve(&self, location: Option<&BrowserLocation>) -> BaseConfiguration {
        BaseConfiguration::resolve(self.configured_base(), location, self.resolve_options())
    }
}
