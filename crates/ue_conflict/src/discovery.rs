//! Container discovery inside a mod (or base game) directory.

use crate::diagnostics::DiagnosticLog;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use walkdir::WalkDir;

/// How a `.utoc` found its `.ucas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasPairing {
    /// Same base name, same directory.
    Exact,
    /// No exact match; the first `.ucas` in the directory was taken.
    Fallback,
    /// No `.ucas` next to the `.utoc`.
    Missing,
}

/// A `.utoc` and its resolved `.ucas`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoStorePair {
    pub utoc: Utf8PathBuf,
    pub ucas: Option<Utf8PathBuf>,
    pub pairing: CasPairing,
}

/// Containers found under one directory, each list sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredContainers {
    pub paks: Vec<Utf8PathBuf>,
    pub iostores: Vec<IoStorePair>,
}

impl DiscoveredContainers {
    pub fn is_empty(&self) -> bool {
        self.paks.is_empty() && self.iostores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paks.len() + self.iostores.len()
    }

    /// File names that may back this mod's entries: every `.pak`, every `.utoc`,
    /// and every resolved `.ucas`.
    pub fn allowed_containers(&self) -> AllowedContainers {
        let mut allowed = AllowedContainers::default();
        for pak in &self.paks {
            allowed.insert_path(pak);
        }
        for pair in &self.iostores {
            allowed.insert_path(&pair.utoc);
            if let Some(ucas) = &pair.ucas {
                allowed.insert_path(ucas);
            }
        }
        allowed
    }
}

/// Case-insensitive set of container file names (no directories).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedContainers {
    names: HashSet<String>,
}

impl AllowedContainers {
    pub fn insert(&mut self, file_name: &str) {
        self.names.insert(file_name.to_lowercase());
    }

    fn insert_path(&mut self, path: &Utf8Path) {
        if let Some(name) = path.file_name() {
            self.insert(name);
        }
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.names.contains(&file_name.to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AllowedContainers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut allowed = Self::default();
        for name in iter {
            allowed.insert(name.as_ref());
        }
        allowed
    }
}

fn has_extension(path: &Utf8Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Recursively collect files under `root` whose extension matches one of
/// `extensions` (case-insensitive), sorted by path.
pub fn find_files(root: &Utf8Path, extensions: &[&str]) -> Vec<Utf8PathBuf> {
    let mut files: Vec<Utf8PathBuf> = WalkDir::new(root.as_std_path())
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| match Utf8PathBuf::from_path_buf(entry.into_path()) {
            Ok(path) => Some(path),
            Err(path) => {
                tracing::warn!("Skipping non-UTF-8 path: {}", path.display());
                None
            }
        })
        .filter(|path| extensions.iter().any(|ext| has_extension(path, ext)))
        .collect();
    files.sort();
    files
}

/// Find the `.ucas` for a `.utoc`: same base name in the same directory, else
/// the first `.ucas` in that directory by name.
pub fn resolve_cas(utoc: &Utf8Path) -> (Option<Utf8PathBuf>, CasPairing) {
    let Some(dir) = utoc.parent() else {
        return (None, CasPairing::Missing);
    };
    let stem = utoc.file_stem().unwrap_or_default();

    let mut siblings: Vec<Utf8PathBuf> = match dir.read_dir_utf8() {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && has_extension(p, "ucas"))
            .collect(),
        Err(_) => Vec::new(),
    };
    siblings.sort_by_key(|p| p.as_str().to_lowercase());

    if let Some(exact) = siblings.iter().find(|p| {
        p.file_stem()
            .is_some_and(|s| s.eq_ignore_ascii_case(stem))
    }) {
        return (Some(exact.clone()), CasPairing::Exact);
    }
    match siblings.into_iter().next() {
        Some(first) => (Some(first), CasPairing::Fallback),
        None => (None, CasPairing::Missing),
    }
}

/// Enumerate the containers under `dir`.
///
/// A missing directory yields nothing. Unpaired or loosely paired `.utoc`s are
/// logged and kept; deciding whether they can be read is the adapter's job.
pub fn discover(dir: &Utf8Path, scope: &str, log: &mut DiagnosticLog) -> DiscoveredContainers {
    if !dir.is_dir() {
        log.warn(scope, format!("Directory not found: {}", dir));
        return DiscoveredContainers::default();
    }

    let files = find_files(dir, &["pak", "utoc"]);
    let mut found = DiscoveredContainers::default();
    for path in files {
        if has_extension(&path, "pak") {
            found.paks.push(path);
            continue;
        }

        let (ucas, pairing) = resolve_cas(&path);
        match (&ucas, pairing) {
            (Some(ucas), CasPairing::Fallback) => log.warn(
                scope,
                format!(
                    "No .ucas named after {}; pairing with {}",
                    path.file_name().unwrap_or_default(),
                    ucas.file_name().unwrap_or_default()
                ),
            ),
            (None, _) => log.warn(
                scope,
                format!("No .ucas next to {}", path.file_name().unwrap_or_default()),
            ),
            _ => {}
        }
        found.iostores.push(IoStorePair {
            utoc: path,
            ucas,
            pairing,
        });
    }

    log.debug(
        scope,
        format!(
            "Discovered {} pak, {} utoc under {}",
            found.paks.len(),
            found.iostores.len(),
            dir
        ),
    );
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn touch(path: &Utf8Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discover_finds_nested_containers() {
        let tmp = TempDir::new().unwrap();
        let root = utf8(&tmp);
        touch(&root.join("Hero_P.pak"));
        touch(&root.join("nested/deeper/Cape_P.PAK"));
        touch(&root.join("io/Hero_IO.utoc"));
        touch(&root.join("io/Hero_IO.ucas"));
        touch(&root.join("readme.txt"));

        let mut log = DiagnosticLog::new();
        let found = discover(&root, "test", &mut log);
        assert_eq!(found.paks.len(), 2);
        assert_eq!(found.iostores.len(), 1);
        assert_eq!(found.iostores[0].pairing, CasPairing::Exact);
        assert_eq!(
            found.iostores[0].ucas.as_deref(),
            Some(root.join("io/Hero_IO.ucas").as_path())
        );
    }

    #[test]
    fn test_fallback_and_missing_pairing() {
        let tmp = TempDir::new().unwrap();
        let root = utf8(&tmp);
        touch(&root.join("a/Hero.utoc"));
        touch(&root.join("a/zzz.ucas"));
        touch(&root.join("a/Other.ucas"));
        touch(&root.join("b/Lonely.utoc"));

        let (ucas, pairing) = resolve_cas(&root.join("a/Hero.utoc"));
        assert_eq!(pairing, CasPairing::Fallback);
        assert_eq!(ucas.unwrap().file_name(), Some("Other.ucas"));

        let (ucas, pairing) = resolve_cas(&root.join("b/Lonely.utoc"));
        assert_eq!(pairing, CasPairing::Missing);
        assert!(ucas.is_none());

        let mut log = DiagnosticLog::new();
        let found = discover(&root, "test", &mut log);
        assert_eq!(found.iostores.len(), 2);
        let warnings = log
            .entries()
            .iter()
            .filter(|e| e.level == crate::diagnostics::DiagnosticLevel::Warn)
            .count();
        assert_eq!(warnings, 2);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let mut log = DiagnosticLog::new();
        let found = discover(&utf8(&tmp).join("nope"), "test", &mut log);
        assert!(found.is_empty());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_allowed_containers_cover_all_files() {
        let found = DiscoveredContainers {
            paks: vec![Utf8PathBuf::from("/m/Hero_P.pak")],
            iostores: vec![IoStorePair {
                utoc: Utf8PathBuf::from("/m/Io.utoc"),
                ucas: Some(Utf8PathBuf::from("/m/Io.ucas")),
                pairing: CasPairing::Exact,
            }],
        };
        let allowed = found.allowed_containers();
        assert_eq!(allowed.len(), 3);
        assert!(allowed.contains("hero_p.PAK"));
        assert!(allowed.contains("Io.ucas"));
        assert!(!allowed.contains("Base.pak"));
    }
}
