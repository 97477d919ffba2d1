//! Writing the entries of a container to disk

use std::fs;
use std::path::Path;

use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::path::entry_destination;
use crate::types::Container;

/// Write every entry of `container` below `dest`, creating directories as needed and
/// overwriting existing files.
///
/// Entries are written in directory order. When one fails, the entries written before it are
/// left in place and the remaining ones are skipped.
#[instrument(skip(container), fields(entries = container.len()), err)]
pub fn extract(container: &Container, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| Error::file(dest, e))?;

    for (entry, data) in container.files() {
        let path = entry_destination(dest, entry.path())?;
        info!("writing {}", path.display());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
        fs::write(&path, data).map_err(|e| Error::file(&path, e))?;
    }

    Ok(())
}
