//! Full-page navigation

use scm_http::Navigator;

/// Navigates by assigning `window.location.href`
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowNavigator;

impl Navigator for WindowNavigator {
    fn navigate(&self, route: &str) {
        let Some(window) = web_sys::window() else {
            tracing::warn!(route, "No window to navigate");
            return;
        };

        if let Err(e) = window.location().set_href(route) {
            tracing::warn!(route, error = ?e, "Navigation failed");
        }
    }
}
