//! Asset path normalization.
//!
//! Container listings carry on-disk style paths such as
//! `../../../Hero/Content/Char/Hero.uasset`. Conflicts are keyed on the cleaned
//! package path (`Hero/Content/Char/Hero`), which keeps the project root: two
//! projects that both ship `Content/Char/Hero` provide different assets.
//!
//! When the game's project name is known, its content maps to the engine's
//! `/Game` root, and `Engine/Content` always maps to `/Engine`.

/// Extensions of files that are packages in their own right. Companion files
/// (`.uexp`, `.ubulk`, ...) belong to the package with the same stem.
pub const PACKAGE_EXTENSIONS: [&str; 2] = ["uasset", "umap"];

/// Whether `path` names a package (`.uasset` or `.umap`, any case).
pub fn is_package_path(path: &str) -> bool {
    strip_package_extension(path).is_some()
}

/// `path` without its package extension, or `None` if it is not a package.
pub fn strip_package_extension(path: &str) -> Option<&str> {
    let (stem, ext) = path.rsplit_once('.')?;
    if ext.contains('/') || ext.contains('\\') {
        return None;
    }
    PACKAGE_EXTENSIONS
        .iter()
        .any(|p| ext.eq_ignore_ascii_case(p))
        .then_some(stem)
}

/// Case-insensitive comparison key for a normalized path.
pub fn asset_key(path: &str) -> String {
    path.to_lowercase()
}

/// Normalize a container entry into a package path.
///
/// - Backslashes become `/`; empty, `.` and `..` segments are dropped.
/// - The package extension is removed. Non-package entries yield `None`.
/// - `<project>/Content/x` maps to `/Game/x` when `project` names it.
/// - `Engine/Content/x` maps to `/Engine/x`.
/// - Anything else keeps every remaining segment, project root included.
///
/// Casing is preserved; compare through [`asset_key`].
pub fn normalize_asset_path(raw: &str, project: Option<&str>) -> Option<String> {
    let cleaned = raw.replace('\\', "/");
    let without_ext = strip_package_extension(&cleaned)?;

    let segments: Vec<&str> = without_ext
        .split('/')
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();
    if segments.is_empty() {
        return None;
    }

    if segments.len() >= 3 && segments[1].eq_ignore_ascii_case("Content") {
        let root = segments[0];
        let rest = segments[2..].join("/");
        if root.eq_ignore_ascii_case("Engine") {
            return Some(format!("/Engine/{}", rest));
        }
        if project.is_some_and(|p| root.eq_ignore_ascii_case(p.trim())) {
            return Some(format!("/Game/{}", rest));
        }
    }

    Some(segments.join("/"))
}
