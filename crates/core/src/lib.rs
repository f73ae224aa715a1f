//! SCM portal client core
//!
//! Everything here is pure computation over configuration and page location:
//! which origin API calls go to and how request paths are rewritten.

pub mod base;
pub mod error;
pub mod location;
pub mod path;
pub mod settings;

pub use base::{BaseConfiguration, BrowserBase, ResolveOptions, ResolverPolicy};
pub use error::{CoreError, CoreResult};
pub use location::BrowserLocation;
pub use path::{apply_path_prefix, is_absolute_url, join_origin};
pub use settings::ClientSettings;
