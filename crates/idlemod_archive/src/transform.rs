//! Packing a folder into a container and unpacking it again

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::extract::extract;
use crate::formats::GameVariant;
use crate::types::Container;
use crate::walk::FileWalker;

/// Direction of a [`transform`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    /// Folder to container
    Pack,
    /// Container to folder
    Unpack,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Pack => "pack",
            Action::Unpack => "unpack",
        })
    }
}

/// Pack `root` into the container at `archive` or unpack that container into `root`.
///
/// The game id is resolved before the filesystem is touched, so an unknown id fails with
/// [`Error::InvalidGameId`] without side effects. Every other failure is wrapped in
/// [`Error::Transform`].
///
/// ```no_run
/// # fn doit() -> idlemod_archive::error::Result<()> {
/// use std::path::Path;
/// use idlemod_archive::{transform, Action};
///
/// transform(Action::Unpack, "mhk_2", Path::new("mhk2-00.dat"), Path::new("data"))?;
/// transform(Action::Pack, "mhk_2", Path::new("mhk2-00.dat"), Path::new("data"))?;
/// # Ok(())
/// # }
/// ```
pub fn transform(action: Action, game_id: &str, archive: &Path, root: &Path) -> Result<()> {
    let game: GameVariant = game_id.parse()?;

    match action {
        Action::Pack => pack(game, archive, root),
        Action::Unpack => unpack(game, archive, root),
    }
    .map_err(|source| Error::Transform {
        action,
        game,
        source: Box::new(source),
    })
}

/// Pack every file below `root` into a new container at `archive`.
///
/// The container is written to a temporary file next to `archive` and only moved into place once
/// it is complete.
#[instrument(skip_all, fields(%game, archive = %archive.display()), err)]
pub fn pack(game: GameVariant, archive: &Path, root: &Path) -> Result<()> {
    let container = FileWalker::new(root).load()?;
    let data = game.encode(&container)?;

    info!("creating {}", archive.display());
    write_atomic(archive, &data)
}

/// Unpack the container at `archive` into `root`
#[instrument(skip_all, fields(%game, archive = %archive.display()), err)]
pub fn unpack(game: GameVariant, archive: &Path, root: &Path) -> Result<()> {
    let container = read_archive(game, archive)?;
    extract(&container, root)
}

/// Read and decode the container at `archive`
pub fn read_archive(game: GameVariant, archive: &Path) -> Result<Container> {
    let data = fs::read(archive).map_err(|e| Error::file(archive, e))?;
    game.decode(&data)
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::file(dir, e))?;
    file.write_all(data)
        .and_then(|_| file.as_file().sync_all())
        .map_err(|e| Error::file(file.path(), e))?;
    file.persist(path).map_err(|e| Error::file(path, e.error))?;

    Ok(())
}
