//! Building [`ModCandidate`]s from the mod library layout.

use crate::error::Result;
use crate::model::{ModCandidate, ModStatus};
use camino::Utf8Path;

/// One candidate per subdirectory of `enabled_root` (enabled) and of
/// `backup_root` (backed up), each list sorted by name.
///
/// A root that does not exist contributes nothing. Real names that appear in
/// both roots are returned twice; the detector de-duplicates and keeps the
/// first.
pub fn enumerate_candidates(
    enabled_root: &Utf8Path,
    backup_root: Option<&Utf8Path>,
) -> Result<Vec<ModCandidate>> {
    let mut candidates = subdirectories(enabled_root, ModStatus::Enabled)?;
    if let Some(backup_root) = backup_root {
        candidates.extend(subdirectories(backup_root, ModStatus::BackedUp)?);
    }
    Ok(candidates)
}

fn subdirectories(root: &Utf8Path, status: ModStatus) -> Result<Vec<ModCandidate>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in root.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string());
        }
    }
    names.sort_by_key(|name| name.to_lowercase());

    Ok(names
        .into_iter()
        .map(|name| ModCandidate::new(name, status))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_enumerates_both_roots() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        for dir in ["Mods/zeta", "Mods/Alpha", "Backup/Old"] {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
        std::fs::write(root.join("Mods/readme.txt"), b"").unwrap();

        let found =
            enumerate_candidates(&root.join("Mods"), Some(&root.join("Backup"))).unwrap();
        assert_eq!(
            found,
            [
                ModCandidate::enabled("Alpha"),
                ModCandidate::enabled("zeta"),
                ModCandidate::backed_up("Old"),
            ]
        );
    }

    #[test]
    fn test_missing_roots_are_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        let found =
            enumerate_candidates(&root.join("nope"), Some(&root.join("also-nope"))).unwrap();
        assert!(found.is_empty());
    }
}
