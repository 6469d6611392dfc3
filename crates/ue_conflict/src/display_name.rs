//! Presentation names for mods.

use crate::discovery::find_files;
use camino::{Utf8Path, Utf8PathBuf};

/// Container extensions in preference order.
const PREFERENCE: [&str; 3] = ["pak", "utoc", "ucas"];

/// Base name of the mod's primary container.
///
/// The longest stem among the `.pak` files wins (ties go to the path that sorts
/// first, ignoring case), then the same rule over `.utoc` files, then `.ucas`.
/// `None` when the directory holds no containers; callers fall back to the
/// mod's real name. Never use the result as an identity.
pub fn resolve_display_name(mod_dir: &Utf8Path) -> Option<String> {
    if !mod_dir.is_dir() {
        return None;
    }
    PREFERENCE
        .iter()
        .find_map(|ext| primary(&find_files(mod_dir, &[*ext])))
}

fn primary(files: &[Utf8PathBuf]) -> Option<String> {
    files
        .iter()
        .filter_map(|path| Some((path, path.file_stem()?)))
        .min_by(|(a_path, a_stem), (b_path, b_stem)| {
            let a_key = a_path.as_str().to_lowercase();
            let b_key = b_path.as_str().to_lowercase();
            b_stem.len().cmp(&a_stem.len()).then_with(|| a_key.cmp(&b_key))
        })
        .map(|(_, stem)| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mod_dir(files: &[&str]) -> (TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        for file in files {
            let path = root.join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"").unwrap();
        }
        (tmp, root)
    }

    #[test]
    fn test_longest_pak_stem_wins() {
        let (_tmp, root) = mod_dir(&["a/Hero_P.pak", "b/HeroCostume_P.pak", "HeroCostumeXX.utoc"]);
        assert_eq!(resolve_display_name(&root).as_deref(), Some("HeroCostume_P"));
    }

    #[test]
    fn test_equal_length_ties_break_on_path() {
        let (_tmp, root) = mod_dir(&["b/Bbbb.pak", "A/Aaaa.pak"]);
        assert_eq!(resolve_display_name(&root).as_deref(), Some("Aaaa"));
    }

    #[test]
    fn test_falls_back_to_iostore_then_none() {
        let (_tmp, root) = mod_dir(&["Cape.ucas", "Cape_P.utoc"]);
        assert_eq!(resolve_display_name(&root).as_deref(), Some("Cape_P"));

        let (_tmp, root) = mod_dir(&["Only.ucas"]);
        assert_eq!(resolve_display_name(&root).as_deref(), Some("Only"));

        let (_tmp, root) = mod_dir(&["Content/Hero.uasset"]);
        assert_eq!(resolve_display_name(&root), None);
    }
}
