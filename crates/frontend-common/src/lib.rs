//! Browser bindings for the SCM API client

pub mod client;
pub mod location;
pub mod logging;
pub mod navigation;
pub mod storage;

pub use client::{api_client, build_settings, create_client};
pub use location::current_location;
pub use logging::init_logging;
pub use navigation::WindowNavigator;
pub use storage::LocalStorageTokenStore;
