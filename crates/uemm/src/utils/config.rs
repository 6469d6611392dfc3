//! Locating, loading and saving `config.json`.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use miette::Result;
use std::env;
use ue_conflict::config::CONFIG_FILE_NAME;
use ue_conflict::AppConfig;

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns the default configuration file path (config.json next to the executable).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// The `--config` override if given, else the default path.
pub fn resolve_config_path(explicit: Option<&str>) -> Result<Utf8PathBuf> {
    match explicit {
        Some(path) => Ok(Utf8PathBuf::from(path)),
        None => default_config_path().ok_or_else(|| CliError::ConfigPathUnknown.into()),
    }
}

/// Loads the configuration. A missing file yields the defaults; a file that
/// exists but cannot be parsed is an error.
pub fn load_config(path: &Utf8Path) -> Result<AppConfig> {
    AppConfig::load(path)
        .map(Option::unwrap_or_default)
        .map_err(|e| CliError::config_parse_error(path.to_path_buf(), e).into())
}

pub fn save_config(path: &Utf8Path, cfg: &AppConfig) -> Result<()> {
    cfg.save(path)
        .map_err(|e| miette::miette!("Failed to save config {}: {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_loads_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("config.json")).unwrap();
        assert_eq!(load_config(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn broken_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("config.json")).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn explicit_path_wins() {
        assert_eq!(
            resolve_config_path(Some("custom/config.json")).unwrap(),
            Utf8PathBuf::from("custom/config.json")
        );
    }
}
