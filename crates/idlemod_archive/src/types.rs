//! Base types shared by every container format.

use std::ops::Range;

use indexmap::IndexMap;

use crate::error::{CorruptArchiveError, Result};

/// A file stored in an archive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileEntry {
    path: Box<str>,
    size: u64,
}

impl FileEntry {
    /// Create an entry for the file at `path` (relative, `/` separated) holding `size` bytes
    pub fn new(path: impl Into<Box<str>>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Get the path of the file relative to the archive root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// The ordered list of files stored in an archive.
///
/// The order of the entries is the order of their bytes in the payload region, so an entry's
/// offset is the sum of the sizes of all entries before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveDirectory {
    entries: IndexMap<Box<str>, FileEntry>,
}

impl ArchiveDirectory {
    /// Create an empty directory with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Append an entry, rejecting a path that is already present
    pub fn push(&mut self, entry: FileEntry) -> Result<()> {
        if self.entries.contains_key(entry.path()) {
            return Err(CorruptArchiveError::DuplicateEntry(entry.path().to_owned()).into());
        }

        self.entries.insert(entry.path.clone(), entry);
        Ok(())
    }

    /// Number of entries in the directory
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search for an entry by path
    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    /// Iterate over the entries in payload order
    pub fn iter(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.values()
    }

    /// Total size of all entries
    pub fn payload_size(&self) -> u64 {
        self.iter().map(FileEntry::size).sum()
    }

    /// Iterate over the entries along with the byte range each occupies in the payload region
    pub fn layout(&self) -> impl Iterator<Item = (&FileEntry, Range<u64>)> {
        self.iter().scan(0u64, |offset, entry| {
            let start = *offset;
            *offset += entry.size();
            Some((entry, start..*offset))
        })
    }
}

impl<'a> IntoIterator for &'a ArchiveDirectory {
    type Item = &'a FileEntry;
    type IntoIter = indexmap::map::Values<'a, Box<str>, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// The decoded form of an archive: its directory plus the plain payload bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    directory: ArchiveDirectory,
    payload: Vec<u8>,
}

impl Container {
    /// Pair a directory with its payload.
    ///
    /// The sizes in `directory` must add up to exactly the length of `payload`.
    pub fn new(directory: ArchiveDirectory, payload: Vec<u8>) -> Result<Self> {
        let actual = payload.len() as u64;

        let mut end = 0u64;
        for entry in directory.iter() {
            end = end
                .checked_add(entry.size())
                .filter(|end| *end <= actual)
                .ok_or_else(|| CorruptArchiveError::EntryOutOfRange(entry.path().to_owned()))?;
        }

        if end != actual {
            return Err(CorruptArchiveError::PayloadSizeMismatch {
                expected: end,
                actual,
            }
            .into());
        }

        Ok(Self { directory, payload })
    }

    /// Get the directory of this container
    pub fn directory(&self) -> &ArchiveDirectory {
        &self.directory
    }

    /// Get the concatenated bytes of every entry
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of files in this container
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Whether this container holds no files
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Iterate over every file with its contents
    pub fn files(&self) -> impl Iterator<Item = (&FileEntry, &[u8])> {
        self.directory
            .layout()
            .map(|(entry, range)| (entry, &self.payload[range.start as usize..range.end as usize]))
    }

    /// Get the contents of a file by path
    pub fn by_name(&self, path: &str) -> Option<&[u8]> {
        self.files()
            .find(|(entry, _)| entry.path() == path)
            .map(|(_, data)| data)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{CorruptArchiveError, Error, Result};
    use crate::types::{ArchiveDirectory, Container, FileEntry};

    fn directory(entries: &[(&str, u64)]) -> Result<ArchiveDirectory> {
        let mut directory = ArchiveDirectory::with_capacity(entries.len());
        for (path, size) in entries {
            directory.push(FileEntry::new(*path, *size))?;
        }
        Ok(directory)
    }

    #[test]
    fn layout_uses_running_offsets() -> Result<()> {
        let directory = directory(&[("a.txt", 3), ("empty", 0), ("b/c.txt", 5)])?;

        let layout = directory
            .layout()
            .map(|(entry, range)| (entry.path().to_owned(), range))
            .collect::<Vec<_>>();

        assert_eq!(
            layout,
            vec![
                ("a.txt".to_owned(), 0..3),
                ("empty".to_owned(), 3..3),
                ("b/c.txt".to_owned(), 3..8),
            ]
        );
        assert_eq!(directory.payload_size(), 8);

        Ok(())
    }

    #[test]
    fn duplicate_paths_are_rejected() -> Result<()> {
        let mut directory = directory(&[("a.txt", 3)])?;
        let result = directory.push(FileEntry::new("a.txt", 1));

        assert!(matches!(
            result,
            Err(Error::CorruptArchive(CorruptArchiveError::DuplicateEntry(_)))
        ));
        assert_eq!(directory.len(), 1);

        Ok(())
    }

    #[test]
    fn container_slices_files() -> Result<()> {
        let container = Container::new(
            directory(&[("hello.txt", 5), ("world.txt", 5)])?,
            b"HelloWorld".to_vec(),
        )?;

        assert_eq!(container.by_name("hello.txt"), Some(&b"Hello"[..]));
        assert_eq!(container.by_name("world.txt"), Some(&b"World"[..]));
        assert_eq!(container.by_name("missing.txt"), None);

        Ok(())
    }

    #[test]
    fn container_rejects_short_payload() -> Result<()> {
        let result = Container::new(directory(&[("hello.txt", 11)])?, b"Hello".to_vec());

        assert!(matches!(
            result,
            Err(Error::CorruptArchive(CorruptArchiveError::EntryOutOfRange(name))) if name == "hello.txt"
        ));

        Ok(())
    }

    #[test]
    fn container_rejects_trailing_payload() -> Result<()> {
        let result = Container::new(directory(&[("hello.txt", 2)])?, b"Hello".to_vec());

        assert!(matches!(
            result,
            Err(Error::CorruptArchive(
                CorruptArchiveError::PayloadSizeMismatch {
                    expected: 2,
                    actual: 5
                }
            ))
        ));

        Ok(())
    }
}
