//! Page location model used for browser-derived API origins

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The parts of a page location that origin discovery looks at.
///
/// Mirrors the browser's `window.location`: `protocol` carries its trailing
/// colon (`"https:"`) and IPv6 hostnames are kept in bracketed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserLocation {
    pub protocol: String,
    pub hostname: String,
    #[serde(default)]
    pub port: Option<u16>,
}

impl BrowserLocation {
    /// Create a location from its parts
    pub fn new(
        protocol: impl Into<String>,
        hostname: impl Into<String>,
        port: Option<u16>,
    ) -> Self {
        let mut protocol = protocol.into();
        if !protocol.ends_with(':') {
            protocol.push(':');
        }

        let hostname = hostname.into();
        let hostname = if hostname.contains(':') && !hostname.starts_with('[') {
            format!("[{hostname}]")
        } else {
            hostname
        };

        Self {
            protocol,
            hostname,
            port,
        }
    }

    /// Parse a location from an absolute page URL such as `https://portal.acme.com/login`
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let parsed = Url::parse(raw).map_err(|e| CoreError::invalid_location(raw, e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| CoreError::invalid_location(raw, "URL has no host"))?;

        Ok(Self::new(parsed.scheme(), host, parsed.port()))
    }

    /// Hostname without IPv6 brackets
    pub fn bare_hostname(&self) -> &str {
        self.hostname
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.hostname)
    }

    /// `{protocol}//{hostname}` with no port
    pub fn host_origin(&self) -> String {
        format!("{}//{}", self.protocol, self.hostname)
    }

    /// `{protocol}//{hostname}:{port}`
    pub fn origin_with_port(&self, port: u16) -> String {
        format!("{}//{}:{port}", self.protocol, self.hostname)
    }

    /// The page origin, including a non-default port when present
    pub fn origin(&self) -> String {
        match self.port {
            Some(port) => self.origin_with_port(port),
            None => self.host_origin(),
        }
    }
}

impl fmt::Display for BrowserLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.origin())
    }
}
