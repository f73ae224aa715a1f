//! CLI configuration utilities

use anyhow::{Context as _, Result};
use scm_core::ClientSettings;
use std::path::{Path, PathBuf};

/// Resolve the state directory: explicit flag, `SCM_STATE_DIR`, then the
/// platform data directory
pub fn state_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        if let Ok(dir) = std::env::var("SCM_STATE_DIR") {
            PathBuf::from(dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("scm")
        }
    })
}

pub fn default_config_path(state_dir: &Path) -> PathBuf {
    state_dir.join("config.toml")
}

/// File the bearer token is persisted in
pub fn session_file(state_dir: &Path) -> PathBuf {
    state_dir.join("session.json")
}

/// Load settings from `config` (or the state directory default) and the environment
pub fn load_settings(config: Option<&Path>, state_dir: &Path) -> Result<ClientSettings> {
    let path = config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_config_path(state_dir));

    ClientSettings::load(Some(&path))
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

/// Write the default settings as TOML
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&ClientSettings::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_state_dir_wins() {
        let dir = PathBuf::from("/tmp/scm-explicit");
        assert_eq!(state_dir(Some(dir.clone())), dir);
        assert_eq!(session_file(&dir), dir.join("session.json"));
    }

    #[test]
    fn generated_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        generate_default_config(&path).unwrap();

        let loaded =
            ClientSettings::load_with_env(Some(&path), Some(Default::default())).unwrap();
        assert_eq!(loaded, ClientSettings::default());
    }
}
