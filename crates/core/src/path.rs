//! Request path rewriting for APIs mounted under a sub-path

use once_cell::sync::Lazy;
use regex::Regex;

static ABSOLUTE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z\d+.-]*://").expect("absolute URL pattern is valid"));

/// Whether `value` starts with a `scheme://` component
pub fn is_absolute_url(value: &str) -> bool {
    ABSOLUTE_URL.is_match(value)
}

/// Prepend `prefix` to a relative request path.
///
/// Absolute URLs and an empty prefix pass through untouched. A path that
/// already equals the prefix, or sits below it, is left alone, so applying
/// this more than once never stacks the prefix.
pub fn apply_path_prefix(prefix: &str, path: &str) -> String {
    if prefix.is_empty() || is_absolute_url(path) {
        return path.to_string();
    }

    let normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let already_prefixed = normalized == prefix
        || normalized
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'));

    if already_prefixed {
        normalized
    } else {
        format!("{prefix}{normalized}")
    }
}

/// Join a request path onto an origin; absolute URLs are returned as-is
pub fn join_origin(origin: &str, path: &str) -> String {
    if is_absolute_url(path) {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}

/// Strip every trailing `/` from `value`
pub(crate) fn trim_trailing_slashes(value: &str) -> &str {
    value.trim_end_matches('/')
}
