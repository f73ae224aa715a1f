//! Page location lookup

use scm_core::BrowserLocation;

/// The current `window.location`, or `None` outside a browser
#[cfg(target_arch = "wasm32")]
pub fn current_location() -> Option<BrowserLocation> {
    let location = web_sys::window()?.location();
    let protocol = location.protocol().ok()?;
    let hostname = location.hostname().ok()?;
    let port = location.port().ok().and_then(|p| parse_port(&p));

    Some(BrowserLocation::new(protocol, hostname, port))
}

/// The current `window.location`, or `None` outside a browser
#[cfg(not(target_arch = "wasm32"))]
pub fn current_location() -> Option<BrowserLocation> {
    None
}

/// `location.port` is an empty string for the scheme's default port
pub fn parse_port(port: &str) -> Option<u16> {
    port.parse().ok()
}
