use crate::crypto::AesKey;
use crate::error::Result;
use camino::Utf8Path;

/// Which family of container a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Pak,
    IoStore,
}

impl ContainerKind {
    /// Classify a path by its extension (`.pak` or `.utoc`), case-insensitively.
    /// `.ucas` files are payload only and are not containers on their own.
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        let ext = path.extension()?;
        if ext.eq_ignore_ascii_case("pak") {
            Some(ContainerKind::Pak)
        } else if ext.eq_ignore_ascii_case("utoc") {
            Some(ContainerKind::IoStore)
        } else {
            None
        }
    }
}

/// An opened container whose file listing can be read.
pub trait Container: Send {
    fn kind(&self) -> ContainerKind;

    /// File name of the container on disk (no directory), when known.
    fn backing_file(&self) -> Option<&str>;

    /// True while the index is encrypted and no accepted key has been submitted.
    fn needs_key(&self) -> bool;

    /// Submit a decryption key. A no-op for unencrypted containers.
    fn submit_key(&mut self, key: &AesKey) -> Result<()>;

    /// Every file path in the container, mount point included.
    fn list_files(&self) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            ContainerKind::from_path(Utf8Path::new("Mods/Hero_P.PAK")),
            Some(ContainerKind::Pak)
        );
        assert_eq!(
            ContainerKind::from_path(Utf8Path::new("Hero_P.utoc")),
            Some(ContainerKind::IoStore)
        );
        assert_eq!(ContainerKind::from_path(Utf8Path::new("Hero_P.ucas")), None);
        assert_eq!(ContainerKind::from_path(Utf8Path::new("README")), None);
    }
}
