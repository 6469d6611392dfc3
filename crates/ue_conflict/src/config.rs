//! Configuration consumed by a scan.
//!
//! [`AppConfig`] mirrors the application's `config.json` (PascalCase keys,
//! unknown keys preserved on save). [`ScanConfig`] is the resolved, typed form
//! handed to the detector: every optional value is `None` when absent or blank,
//! never an empty string.
//!
//! Resolution order for the engine version is environment variable, then
//! config file, then [`EngineVersion::default`]. The base game path follows the
//! same order.

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use ue_container::{AesKey, EngineVersion};

/// Environment override for the engine version tag.
pub const ENV_UE_VERSION: &str = "UEMM_UE_VERSION";
/// Environment override for the base game installation path.
pub const ENV_GAME_BASE: &str = "UEMM_GAME_BASE";
/// File name of the application configuration.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// The application's `config.json`.
///
/// ```json
/// {
///   "UEVersion": "UE5_1",
///   "AesKey": "0x...",
///   "GameBasePath": "D:/Games/Hero",
///   "ProjectName": "Hero",
///   "ModPath": "D:/Games/Hero/Mods",
///   "BackupPath": "D:/UEMM/Backup"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppConfig {
    #[serde(rename = "UEVersion", default, skip_serializing_if = "Option::is_none")]
    pub ue_version: Option<String>,

    #[serde(alias = "AESKey", default, skip_serializing_if = "Option::is_none")]
    pub aes_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_base_path: Option<Utf8PathBuf>,

    /// Project directory name inside the game's containers. Its content is
    /// reported under `/Game`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mod_path: Option<Utf8PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<Utf8PathBuf>,

    /// Keys owned by other parts of the application.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

impl AppConfig {
    /// Load from a file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist and `Err` if it exists but
    /// cannot be parsed.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>> {
        if !path.as_std_path().exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(Some(config))
    }

    /// Save to a file, creating parent directories if needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent.as_std_path())?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_std_path(), contents)?;
        Ok(())
    }

    /// Configured engine version tag, if set and not blank.
    pub fn ue_version_tag(&self) -> Option<&str> {
        non_blank(self.ue_version.as_deref())
    }

    /// Configured base game path, if set and not blank.
    pub fn game_base_path(&self) -> Option<&Utf8Path> {
        non_blank(self.game_base_path.as_ref().map(|p| p.as_str())).map(Utf8Path::new)
    }

    pub fn project_name(&self) -> Option<&str> {
        non_blank(self.project_name.as_deref())
    }

    pub fn mod_path(&self) -> Option<&Utf8Path> {
        non_blank(self.mod_path.as_ref().map(|p| p.as_str())).map(Utf8Path::new)
    }

    pub fn backup_path(&self) -> Option<&Utf8Path> {
        non_blank(self.backup_path.as_ref().map(|p| p.as_str())).map(Utf8Path::new)
    }

    /// The configured AES key.
    ///
    /// A malformed key is logged and treated as absent; plenty of mods are not
    /// encrypted at all, so a bad key must not stop a scan.
    pub fn aes_key(&self) -> Option<AesKey> {
        let text = non_blank(self.aes_key.as_deref())?;
        match text.parse::<AesKey>() {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!("Ignoring configured AES key: {}", e);
                None
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Picks the engine version dialect for a scan.
///
/// The first non-blank source wins; a tag that names no known version falls
/// back to the default instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineVersionResolver {
    env_override: Option<String>,
    config_tag: Option<String>,
}

impl EngineVersionResolver {
    pub fn new(env_override: Option<String>, config_tag: Option<String>) -> Self {
        Self {
            env_override,
            config_tag,
        }
    }

    /// Read the override from [`ENV_UE_VERSION`] and the tag from `config`.
    pub fn from_environment(config: Option<&AppConfig>) -> Self {
        Self::new(
            env_var(ENV_UE_VERSION),
            config.and_then(|c| c.ue_version_tag()).map(str::to_string),
        )
    }

    pub fn resolve(&self) -> EngineVersion {
        let tag = non_blank(self.env_override.as_deref())
            .or_else(|| non_blank(self.config_tag.as_deref()));

        match tag {
            Some(tag) => EngineVersion::parse_tag(tag).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown engine version '{}', using {}",
                    tag,
                    EngineVersion::default()
                );
                EngineVersion::default()
            }),
            None => EngineVersion::default(),
        }
    }
}

/// Resolved inputs for a conflict scan.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub engine_version: EngineVersion,
    pub aes_key: Option<AesKey>,
    /// Base game installation. Its `Content/Paks` containers are mounted as
    /// reference context only and never contribute assets to a mod.
    pub game_base_path: Option<Utf8PathBuf>,
    /// Project whose `Content` maps to `/Game`. Without it, paths keep their
    /// project root.
    pub project_name: Option<String>,
}

impl ScanConfig {
    pub fn new(engine_version: EngineVersion) -> Self {
        Self {
            engine_version,
            ..Self::default()
        }
    }

    pub fn with_aes_key(mut self, key: AesKey) -> Self {
        self.aes_key = Some(key);
        self
    }

    pub fn with_game_base_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.game_base_path = Some(path.into());
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Resolve from `config` plus the process environment.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::resolve(
            env_var(ENV_UE_VERSION),
            env_var(ENV_GAME_BASE),
            config,
        )
    }

    /// Resolve from explicit environment values. Pure; used by
    /// [`from_app_config`](Self::from_app_config) and tests.
    pub fn resolve(
        env_version: Option<String>,
        env_game_base: Option<String>,
        config: &AppConfig,
    ) -> Self {
        let engine_version = EngineVersionResolver::new(
            env_version,
            config.ue_version_tag().map(str::to_string),
        )
        .resolve();

        let game_base_path = non_blank(env_game_base.as_deref())
            .map(Utf8PathBuf::from)
            .or_else(|| config.game_base_path().map(Utf8Path::to_path_buf));

        Self {
            engine_version,
            aes_key: config.aes_key(),
            game_base_path,
            project_name: config.project_name().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const KEY: &str = "0x4D6F64436F6E666C6963744465746563746F722D5465737420204B6579212121";

    fn config(json: &str) -> AppConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_pascal_case_keys_and_aes_alias() {
        let cfg = config(&format!(
            concat!(
                r#"{{"UEVersion": "UE5_1", "AESKey": "{}", "#,
                r#""GameBasePath": "/games/hero", "ModPath": "/mods"}}"#
            ),
            KEY
        ));
        assert_eq!(cfg.ue_version_tag(), Some("UE5_1"));
        assert!(cfg.aes_key().is_some());
        assert_eq!(cfg.game_base_path(), Some(Utf8Path::new("/games/hero")));
        assert_eq!(cfg.mod_path(), Some(Utf8Path::new("/mods")));
        assert_eq!(cfg.backup_path(), None);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let cfg = config(r#"{"UEVersion": "  ", "AesKey": "", "GameBasePath": ""}"#);
        assert_eq!(cfg.ue_version_tag(), None);
        assert!(cfg.aes_key().is_none());
        assert_eq!(cfg.game_base_path(), None);
    }

    #[test]
    fn test_malformed_key_is_ignored() {
        let cfg = config(r#"{"AesKey": "not-hex"}"#);
        assert!(cfg.aes_key().is_none());
    }

    #[test]
    fn test_unknown_keys_survive_save() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        std::fs::write(&path, r#"{"Theme": "dark", "ModPath": "/mods"}"#).unwrap();

        let mut cfg = AppConfig::load(&path).unwrap().unwrap();
        cfg.ue_version = Some("UE4_26".into());
        cfg.save(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["Theme"], "dark");
        assert_eq!(raw["UEVersion"], "UE4_26");
        assert_eq!(raw["ModPath"], "/mods");
        assert!(raw.get("AesKey").is_none());
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing.json")).unwrap();
        assert!(AppConfig::load(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_json_is_error() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_version_resolution_order() {
        let both = EngineVersionResolver::new(Some("UE5_3".into()), Some("UE4_25".into()));
        assert_eq!(both.resolve(), EngineVersion::Ue5_3);

        let config_only = EngineVersionResolver::new(None, Some("ue4_25".into()));
        assert_eq!(config_only.resolve(), EngineVersion::Ue4_25);

        let blank_env = EngineVersionResolver::new(Some(" ".into()), Some("UE5".into()));
        assert_eq!(blank_env.resolve(), EngineVersion::Ue5_0);

        assert_eq!(EngineVersionResolver::default().resolve(), EngineVersion::Ue4_27);
    }

    #[test]
    fn test_unknown_tag_falls_back_to_default() {
        let resolver = EngineVersionResolver::new(Some("UE9_9".into()), Some("UE5_1".into()));
        assert_eq!(resolver.resolve(), EngineVersion::default());
    }

    #[test]
    fn test_scan_config_env_overrides_game_base() {
        let cfg = config(r#"{"UEVersion": "UE5_2", "GameBasePath": "/from/config"}"#);

        let scan = ScanConfig::resolve(None, Some("/from/env".into()), &cfg);
        assert_eq!(scan.engine_version, EngineVersion::Ue5_2);
        assert_eq!(scan.game_base_path.as_deref(), Some(Utf8Path::new("/from/env")));

        let scan = ScanConfig::resolve(None, None, &cfg);
        assert_eq!(scan.game_base_path.as_deref(), Some(Utf8Path::new("/from/config")));
        assert!(scan.aes_key.is_none());
    }

    #[test]
    fn test_project_name_is_carried_when_set() {
        let scan = ScanConfig::resolve(None, None, &config(r#"{"ProjectName": " Hero "}"#));
        assert_eq!(scan.project_name.as_deref(), Some("Hero"));

        let scan = ScanConfig::resolve(None, None, &config(r#"{"ProjectName": ""}"#));
        assert_eq!(scan.project_name, None);
    }
}
