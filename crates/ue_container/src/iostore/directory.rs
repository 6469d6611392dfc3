use crate::error::{ContainerError, Result};
use crate::io_ext::{checked_count, ReadFStringExt};
use byteorder::{ReadBytesExt, LE};
use std::io::Cursor;

/// Marks an absent link in the directory tree.
pub const NONE: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DirectoryEntry {
    pub name: u32,
    pub first_child: u32,
    pub next_sibling: u32,
    pub first_file: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FileEntry {
    pub name: u32,
    pub next_file: u32,
    /// Index into the TOC chunk table.
    pub user_data: u32,
}

/// Decoded directory index: mount point plus a tree of directories and files
/// whose names live in a shared string table. Directory 0 is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DirectoryIndex {
    pub mount_point: String,
    pub directories: Vec<DirectoryEntry>,
    pub files: Vec<FileEntry>,
    pub strings: Vec<String>,
}

impl DirectoryIndex {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let mount_point = cursor.read_fstring()?;

        let count = read_array_len(&mut cursor, 16)?;
        let mut directories = Vec::with_capacity(count);
        for _ in 0..count {
            directories.push(DirectoryEntry {
                name: cursor.read_u32::<LE>()?,
                first_child: cursor.read_u32::<LE>()?,
                next_sibling: cursor.read_u32::<LE>()?,
                first_file: cursor.read_u32::<LE>()?,
            });
        }

        let count = read_array_len(&mut cursor, 12)?;
        let mut files = Vec::with_capacity(count);
        for _ in 0..count {
            files.push(FileEntry {
                name: cursor.read_u32::<LE>()?,
                next_file: cursor.read_u32::<LE>()?,
                user_data: cursor.read_u32::<LE>()?,
            });
        }

        let count = read_array_len(&mut cursor, 4)?;
        let mut strings = Vec::with_capacity(count);
        for _ in 0..count {
            strings.push(cursor.read_fstring()?);
        }

        Ok(Self {
            mount_point,
            directories,
            files,
            strings,
        })
    }

    /// Full paths of every file whose chunk index is below `entry_count`.
    pub fn file_paths(&self, entry_count: u32) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        if self.directories.is_empty() {
            return Ok(paths);
        }

        let mut visited = vec![false; self.directories.len()];
        let mut pending = vec![(0u32, String::new())];
        while let Some((dir_index, prefix)) = pending.pop() {
            let seen = visited
                .get_mut(dir_index as usize)
                .ok_or_else(|| Self::broken_link("directory", dir_index))?;
            if *seen {
                return Err(ContainerError::malformed(
                    "IoStore directory index",
                    "directory tree contains a cycle",
                ));
            }
            *seen = true;
            let dir = self.directories[dir_index as usize];

            let mut file_index = dir.first_file;
            let mut steps = 0usize;
            while file_index != NONE {
                let file = self
                    .files
                    .get(file_index as usize)
                    .ok_or_else(|| Self::broken_link("file", file_index))?;
                steps += 1;
                if steps > self.files.len() {
                    return Err(ContainerError::malformed(
                        "IoStore directory index",
                        "file chain contains a cycle",
                    ));
                }
                if file.user_data < entry_count {
                    let name = self.string(file.name)?;
                    paths.push(format!("{}{}{}", self.mount_point, prefix, name));
                } else {
                    tracing::debug!(
                        "Skipping directory entry with chunk index {} (entry count {})",
                        file.user_data,
                        entry_count
                    );
                }
                file_index = file.next_file;
            }

            let mut child_index = dir.first_child;
            while child_index != NONE {
                let child = self
                    .directories
                    .get(child_index as usize)
                    .ok_or_else(|| Self::broken_link("directory", child_index))?;
                let name = self.string(child.name)?;
                pending.push((child_index, format!("{}{}/", prefix, name)));
                child_index = child.next_sibling;
                if pending.len() > self.directories.len() {
                    return Err(ContainerError::malformed(
                        "IoStore directory index",
                        "sibling chain contains a cycle",
                    ));
                }
            }
        }
        Ok(paths)
    }

    fn string(&self, index: u32) -> Result<&str> {
        self.strings
            .get(index as usize)
            .map(String::as_str)
            .ok_or_else(|| Self::broken_link("string", index))
    }

    fn broken_link(what: &str, index: u32) -> ContainerError {
        ContainerError::malformed(
            "IoStore directory index",
            format!("{} index {} out of range", what, index),
        )
    }

    /// Build an index from full relative paths; file `i` gets chunk index `i`.
    #[cfg(any(test, feature = "fixtures"))]
    pub fn from_paths<S: AsRef<str>>(mount_point: &str, paths: &[S]) -> Self {
        let mut index = DirectoryIndex {
            mount_point: mount_point.to_string(),
            directories: vec![DirectoryEntry {
                name: NONE,
                first_child: NONE,
                next_sibling: NONE,
                first_file: NONE,
            }],
            files: Vec::new(),
            strings: Vec::new(),
        };

        for (chunk, path) in paths.iter().enumerate() {
            let parts: Vec<&str> = path.as_ref().split('/').collect();
            let Some((file_name, dirs)) = parts.split_last() else {
                continue;
            };
            let mut dir = 0usize;
            for part in dirs {
                dir = index.child_dir(dir, part);
            }
            let name = index.intern(file_name);
            let file = index.files.len() as u32;
            index.files.push(FileEntry {
                name,
                next_file: index.directories[dir].first_file,
                user_data: chunk as u32,
            });
            index.directories[dir].first_file = file;
        }
        index
    }

    #[cfg(any(test, feature = "fixtures"))]
    fn intern(&mut self, value: &str) -> u32 {
        match self.strings.iter().position(|s| s == value) {
            Some(i) => i as u32,
            None => {
                self.strings.push(value.to_string());
                (self.strings.len() - 1) as u32
            }
        }
    }

    #[cfg(any(test, feature = "fixtures"))]
    fn child_dir(&mut self, parent: usize, name: &str) -> usize {
        let mut child = self.directories[parent].first_child;
        while child != NONE {
            let entry = self.directories[child as usize];
            if self.strings[entry.name as usize] == name {
                return child as usize;
            }
            child = entry.next_sibling;
        }
        let name = self.intern(name);
        let index = self.directories.len();
        self.directories.push(DirectoryEntry {
            name,
            first_child: NONE,
            next_sibling: self.directories[parent].first_child,
            first_file: NONE,
        });
        self.directories[parent].first_child = index as u32;
        index
    }

    #[cfg(any(test, feature = "fixtures"))]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        crate::io_ext::write_fstring(&mut out, &self.mount_point);
        out.extend_from_slice(&(self.directories.len() as i32).to_le_bytes());
        for dir in &self.directories {
            for value in [dir.name, dir.first_child, dir.next_sibling, dir.first_file] {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        out.extend_from_slice(&(self.files.len() as i32).to_le_bytes());
        for file in &self.files {
            for value in [file.name, file.next_file, file.user_data] {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        out.extend_from_slice(&(self.strings.len() as i32).to_le_bytes());
        for s in &self.strings {
            crate::io_ext::write_fstring(&mut out, s);
        }
        out
    }
}

fn read_array_len(cursor: &mut Cursor<&[u8]>, element_size: u64) -> Result<usize> {
    let len = cursor.read_i32::<LE>()?;
    if len < 0 {
        return Err(ContainerError::malformed(
            "IoStore directory index",
            format!("negative array length {}", len),
        ));
    }
    checked_count(cursor, len as u64, element_size, "IoStore directory index")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_paths_are_rebuilt_from_tree() {
        let index = DirectoryIndex::from_paths(
            "../../../",
            &[
                "Hero/Content/Char/Hero.uasset",
                "Hero/Content/Char/Hero.uexp",
                "Hero/Content/Maps/Arena.umap",
                "Top.uasset",
            ],
        );
        let parsed = DirectoryIndex::parse(&index.to_bytes()).unwrap();
        assert_eq!(parsed, index);

        let paths = sorted(parsed.file_paths(4).unwrap());
        assert_eq!(
            paths,
            vec![
                "../../../Hero/Content/Char/Hero.uasset",
                "../../../Hero/Content/Char/Hero.uexp",
                "../../../Hero/Content/Maps/Arena.umap",
                "../../../Top.uasset",
            ]
        );
    }

    #[test]
    fn test_out_of_range_chunk_index_is_skipped() {
        let index = DirectoryIndex::from_paths("/", &["A.uasset", "B.uasset", "C.uasset"]);
        // Only chunks 0 and 1 exist in the TOC
        let paths = sorted(index.file_paths(2).unwrap());
        assert_eq!(paths, vec!["/A.uasset", "/B.uasset"]);
    }

    #[test]
    fn test_empty_index_has_no_files() {
        let index = DirectoryIndex::default();
        assert!(index.file_paths(10).unwrap().is_empty());
    }

    #[test]
    fn test_broken_string_reference_is_malformed() {
        let mut index = DirectoryIndex::from_paths("/", &["A.uasset"]);
        index.files[0].name = 99;
        assert!(matches!(
            index.file_paths(1),
            Err(ContainerError::Malformed { .. })
        ));
    }

    #[test]
    fn test_file_cycle_is_detected() {
        let mut index = DirectoryIndex::from_paths("/", &["A.uasset"]);
        index.files[0].next_file = 0;
        assert!(index.file_paths(1).is_err());
    }

    #[test]
    fn test_negative_length_is_rejected() {
        let mut bytes = Vec::new();
        crate::io_ext::write_fstring(&mut bytes, "/");
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        assert!(DirectoryIndex::parse(&bytes).is_err());
    }
}
