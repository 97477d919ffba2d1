//! Enumerating a folder into an archive directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::path::normalize_rel_path;
use crate::types::{ArchiveDirectory, Container, FileEntry};

/// Walks a folder and collects every regular file below it.
///
/// Entries are ordered by their normalized path, so walking an unchanged folder always yields the
/// same directory. Symbolic links to directories are followed.
///
/// ```no_run
/// # fn doit() -> idlemod_archive::error::Result<()> {
/// let walker = idlemod_archive::FileWalker::new("mods/mhk_2/classic_karts");
///
/// for entry in walker.walk()?.iter() {
///     println!("{} ({} bytes)", entry.path(), entry.size());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
}

impl FileWalker {
    /// Create a walker for the folder at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The folder being walked
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect every file below the root, sorted by path
    #[instrument(skip(self), fields(root = %self.root.display()), err)]
    pub fn walk(&self) -> Result<ArchiveDirectory> {
        let metadata = fs::metadata(&self.root).map_err(|e| Error::file(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(Error::file(
                &self.root,
                io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
            ));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                let msg = e.to_string();
                let source = e.into_io_error().unwrap_or_else(|| io::Error::other(msg));
                Error::file(path, source)
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let size = entry
                .metadata()
                .map_err(|e| {
                    let msg = e.to_string();
                    let source = e.into_io_error().unwrap_or_else(|| io::Error::other(msg));
                    Error::file(entry.path(), source)
                })?
                .len();

            files.push(FileEntry::new(
                normalize_rel_path(&self.root, entry.path())?,
                size,
            ));
        }

        files.sort_by(|a, b| a.path().as_bytes().cmp(b.path().as_bytes()));
        debug!(count = files.len(), "walked folder");

        let mut directory = ArchiveDirectory::with_capacity(files.len());
        for file in files {
            directory.push(file)?;
        }

        Ok(directory)
    }

    /// Walk the root and read every file into a [`Container`]
    #[instrument(skip(self), fields(root = %self.root.display()), err)]
    pub fn load(&self) -> Result<Container> {
        let directory = self.walk()?;

        let mut payload = Vec::with_capacity(directory.payload_size() as usize);
        for entry in directory.iter() {
            let path = self.host_path(entry.path());
            info!("packing {}", entry.path());

            let data = fs::read(&path).map_err(|e| Error::file(&path, e))?;
            if data.len() as u64 != entry.size() {
                return Err(Error::file(
                    &path,
                    io::Error::other("file changed while it was being packed"),
                ));
            }
            payload.extend_from_slice(&data);
        }

        Container::new(directory, payload)
    }

    /// Location of the entry `name` below the root
    pub fn host_path(&self, name: &str) -> PathBuf {
        name.split('/').fold(self.root.clone(), |path, part| path.join(part))
    }
}
