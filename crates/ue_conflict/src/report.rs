//! Conflict report persistence.
//!
//! A [`ConflictReport`] wraps a [`ModConflictResult`] with when and how it was
//! produced, and is written as pretty JSON named after its timestamp
//! (`ConflictReport_20250101_120000.json`), usually into the mod root.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "version": 1,
//!   "generatedAt": "2025-01-01T12:00:00+01:00",
//!   "engineVersion": "UE4_27",
//!   "result": { "scannedMods": 2, "conflicts": [ ... ], ... }
//! }
//! ```

use crate::error::Result;
use crate::model::ModConflictResult;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use ue_container::EngineVersion;

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub version: u32,
    pub generated_at: DateTime<Local>,
    /// Engine version tag the scan ran with.
    pub engine_version: String,
    pub result: ModConflictResult,
}

impl ConflictReport {
    pub fn new(result: ModConflictResult, engine_version: EngineVersion) -> Self {
        Self {
            version: REPORT_VERSION,
            generated_at: Local::now(),
            engine_version: engine_version.tag().to_string(),
            result,
        }
    }

    /// `ConflictReport_YYYYMMDD_HHMMSS.json` for the report's timestamp.
    pub fn file_name(&self) -> String {
        format!(
            "ConflictReport_{}.json",
            self.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write into `dir` under [`file_name`](Self::file_name). Returns the path written.
    pub fn save_to_dir(&self, dir: &Utf8Path) -> Result<Utf8PathBuf> {
        let path = dir.join(self.file_name());
        self.save(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_std_path(), contents)?;
        tracing::info!("Conflict report written to {}", path);
        Ok(())
    }

    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>> {
        if !path.as_std_path().exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path.as_std_path())?;
        Ok(Some(serde_json::from_str(&contents)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConflictEntry, ModConflictSummary};
    use chrono::TimeZone;
    use std::time::Duration;

    fn sample_result() -> ModConflictResult {
        ModConflictResult {
            scanned_mods: 2,
            total_assets: 3,
            conflict_asset_count: 1,
            conflicts: vec![ConflictEntry {
                asset_path: "/Game/Char/Hero".to_string(),
                providing_mods: vec!["Hero_A".to_string(), "Hero_B".to_string()],
            }],
            summaries: vec![ModConflictSummary {
                display_name: "Hero_A".to_string(),
                real_name: "Hero_A".to_string(),
                conflict_count: 1,
                sample_conflict_paths: vec!["/Game/Char/Hero".to_string()],
            }],
            mode_description: "Enabled mods only".to_string(),
            elapsed: Duration::from_millis(1500),
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_file_name_uses_timestamp() {
        let mut report = ConflictReport::new(sample_result(), EngineVersion::Ue5_1);
        report.generated_at = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(report.file_name(), "ConflictReport_20250307_090501.json");
        assert_eq!(report.engine_version, "UE5_1");
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Utf8PathBuf::from_path_buf(tmp.path().join("reports")).unwrap();

        let report = ConflictReport::new(sample_result(), EngineVersion::default());
        let path = report.save_to_dir(&dir).unwrap();
        assert!(path.as_str().ends_with(&report.file_name()));

        let loaded = ConflictReport::load(&path).unwrap().unwrap();
        assert_eq!(loaded.result, report.result);
        assert_eq!(loaded.generated_at, report.generated_at);
    }

    #[test]
    fn test_load_missing_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(tmp.path().join("none.json")).unwrap();
        assert!(ConflictReport::load(&path).unwrap().is_none());
    }
}
