//! API base resolution
//!
//! Decides which origin every request goes to and which path prefix, if any,
//! is put in front of relative request paths. Three deployment shapes are
//! supported:
//!
//! - the API reverse-proxied under a sub-path of a shared domain
//!   (`/api-gateway` or `https://gateway.acme.com/scm/v2`)
//! - an explicit absolute backend URL (`https://backend.acme.com`)
//! - nothing configured, in which case the origin is discovered from the page
//!   location by naming convention
//!
//! Configuration always wins over discovery when it is present and non-empty.

use crate::location::BrowserLocation;
use crate::path::{apply_path_prefix, is_absolute_url, join_origin, trim_trailing_slashes};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Port a locally running backend listens on during development
pub const DEFAULT_LOCAL_BACKEND_PORT: u16 = 5000;

const LOCAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

static IPV4_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.){3}\d+$").expect("IPv4 pattern is valid"));

/// How a configured base string is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolverPolicy {
    /// Absolute values contribute origin and path prefix, relative values are
    /// a pure path prefix
    #[default]
    PathPrefix,
    /// The configured value is used as the origin verbatim and any path in it
    /// is ignored; no request rewriting happens
    OriginOnly,
}

impl ResolverPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PathPrefix => "path-prefix",
            Self::OriginOnly => "origin-only",
        }
    }
}

impl fmt::Display for ResolverPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolverPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "path-prefix" | "path_prefix" | "prefix" => Ok(Self::PathPrefix),
            "origin-only" | "origin_only" | "origin" => Ok(Self::OriginOnly),
            other => Err(format!(
                "unknown resolver policy '{other}' (expected 'path-prefix' or 'origin-only')"
            )),
        }
    }
}

/// Knobs for [`BaseConfiguration::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub policy: ResolverPolicy,
    pub local_backend_port: u16,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            policy: ResolverPolicy::default(),
            local_backend_port: DEFAULT_LOCAL_BACKEND_PORT,
        }
    }
}

/// What an explicit configuration string contributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfiguredBase {
    pub origin: Option<String>,
    pub path_prefix: String,
}

/// Origin candidates discovered from the page location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserBase {
    pub primary: String,
    pub fallback: String,
}

/// Interpret an explicit configuration string.
///
/// `None`, empty and slash-only values mean "not configured".
pub fn configured_base(raw: Option<&str>, policy: ResolverPolicy) -> ConfiguredBase {
    let normalized = trim_trailing_slashes(raw.unwrap_or_default().trim());
    if normalized.is_empty() {
        return ConfiguredBase::default();
    }

    if is_absolute_url(normalized) {
        return match split_absolute(normalized) {
            Some((origin, path)) => ConfiguredBase {
                origin: Some(origin),
                path_prefix: match policy {
                    ResolverPolicy::PathPrefix => normalize_prefix(&path),
                    ResolverPolicy::OriginOnly => String::new(),
                },
            },
            None => {
                tracing::warn!(
                    value = normalized,
                    "Invalid absolute API base value, falling back to raw string"
                );
                ConfiguredBase {
                    origin: Some(normalized.to_string()),
                    path_prefix: String::new(),
                }
            }
        };
    }

    match policy {
        ResolverPolicy::PathPrefix => ConfiguredBase {
            origin: None,
            path_prefix: normalize_prefix(normalized),
        },
        ResolverPolicy::OriginOnly => ConfiguredBase {
            origin: Some(normalized.to_string()),
            path_prefix: String::new(),
        },
    }
}

/// Derive API origin candidates from the page location.
///
/// Checked in order: local development hosts go to `local_backend_port`, IP
/// literals are used directly, `api.*` hosts are already the API, and any
/// other host gets an `api.` sibling (dropping a leading `www.`) with the page
/// origin as the fallback candidate.
pub fn browser_base(location: &BrowserLocation, local_backend_port: u16) -> BrowserBase {
    let hostname = location.bare_hostname();

    if LOCAL_HOSTS.contains(&hostname) || hostname.ends_with(".local") {
        let local = location.origin_with_port(local_backend_port);
        return BrowserBase {
            primary: local.clone(),
            fallback: local,
        };
    }

    if IPV4_LITERAL.is_match(hostname) || hostname.contains(':') {
        let direct = location.host_origin();
        return BrowserBase {
            primary: direct.clone(),
            fallback: direct,
        };
    }

    if hostname.starts_with("api.") {
        let api = location.origin();
        return BrowserBase {
            primary: api.clone(),
            fallback: api,
        };
    }

    let bare = hostname.strip_prefix("www.").unwrap_or(hostname);
    BrowserBase {
        primary: format!("{}//api.{bare}", location.protocol),
        fallback: location.origin(),
    }
}

/// Resolved origin and path prefix, fixed for the life of a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseConfiguration {
    origin: Option<String>,
    path_prefix: String,
    policy: ResolverPolicy,
}

impl BaseConfiguration {
    /// Resolve from an optional configuration string and an optional page location
    pub fn resolve(
        configured: Option<&str>,
        location: Option<&BrowserLocation>,
        options: ResolveOptions,
    ) -> Self {
        let ConfiguredBase {
            origin,
            path_prefix,
        } = configured_base(configured, options.policy);

        let origin = match origin {
            // A relative origin-only base is mounted on the page's own origin
            Some(relative) if !is_absolute_url(&relative) => {
                let joined = location.map(|loc| join_origin(&loc.origin(), &relative));
                if joined.is_none() {
                    tracing::warn!(
                        value = %relative,
                        "Relative API base needs a page location to resolve against"
                    );
                }
                joined
            }
            Some(absolute) => Some(absolute),
            None => location.map(|loc| browser_base(loc, options.local_backend_port).primary),
        };

        tracing::debug!(
            origin = origin.as_deref().unwrap_or("<none>"),
            path_prefix = %path_prefix,
            policy = %options.policy,
            "Resolved API base configuration"
        );

        Self {
            origin,
            path_prefix,
            policy: options.policy,
        }
    }

    /// Origin requests are sent to, if one could be determined
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Prefix put in front of relative request paths; empty when unused
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn policy(&self) -> ResolverPolicy {
        self.policy
    }

    /// Apply the path prefix to a request path
    pub fn rewrite_path(&self, path: &str) -> String {
        apply_path_prefix(&self.path_prefix, path)
    }

    /// Full request URL for `path`, or `None` when a relative path has no origin to join
    pub fn url_for(&self, path: &str) -> Option<String> {
        let rewritten = self.rewrite_path(path);
        if is_absolute_url(&rewritten) {
            return Some(rewritten);
        }

        self.origin
            .as_deref()
            .map(|origin| join_origin(origin, &rewritten))
    }
}

/// Split an absolute URL into `scheme://host[:port]` and its path
fn split_absolute(value: &str) -> Option<(String, String)> {
    let parsed = Url::parse(value).ok()?;
    let host = parsed.host_str().filter(|h| !h.is_empty())?;

    let origin = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };

    Some((origin, parsed.path().to_string()))
}

/// Exactly one leading slash, no trailing slash, empty when nothing is left
fn normalize_prefix(path: &str) -> String {
    let inner = path.trim_matches('/');
    if inner.is_empty() {
        String::new()
    } else {
        format!("/{inner}")
    }
}
