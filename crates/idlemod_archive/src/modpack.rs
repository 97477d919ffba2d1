//! Overlaying mods on the container of a game

use std::fs;
use std::path::{Path, PathBuf};

use bon::Builder;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::formats::GameVariant;
use crate::path::entry_destination;
use crate::transform::{pack, unpack, Action};
use crate::walk::FileWalker;

/// Files at the top of a mod folder that describe the mod rather than belong to the game
pub const MOD_METADATA: [&str; 2] = ["README.md", "config.json"];

/// Builds a new container from an original one with a list of mods applied on top.
///
/// Mods are folders laid out like the unpacked container. They are applied in the order given,
/// so a later mod replaces files of an earlier one.
///
/// ```no_run
/// # fn doit() -> idlemod_archive::error::Result<()> {
/// use idlemod_archive::ModPack;
///
/// ModPack::builder()
///     .game("mhk_2.de")
///     .original("original/mhk2-00.dat")
///     .output("game/mhk2-00.dat")
///     .mods(vec!["mods/hd_textures".into(), "mods/classic_karts".into()])
///     .build()
///     .run()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
pub struct ModPack {
    /// Game id of the container
    #[builder(into)]
    game: String,

    /// The unmodified container
    #[builder(into)]
    original: PathBuf,

    /// Where the modded container is written
    #[builder(into)]
    output: PathBuf,

    /// Mod folders, applied in order
    mods: Vec<PathBuf>,
}

impl ModPack {
    /// Unpack the original container, apply every mod and pack the result to the output
    #[instrument(skip(self), fields(game = %self.game, output = %self.output.display()), err)]
    pub fn run(&self) -> Result<()> {
        let game: GameVariant = self.game.parse()?;
        if self.mods.is_empty() {
            return Err(Error::NoMods);
        }

        let work = tempfile::tempdir()?;
        debug!(work = %work.path().display(), "unpacking original");

        unpack(game, &self.original, work.path()).map_err(|source| Error::Transform {
            action: Action::Unpack,
            game,
            source: Box::new(source),
        })?;

        for folder in &self.mods {
            apply_mod(&FileWalker::new(folder), work.path())?;
        }

        pack(game, &self.output, work.path()).map_err(|source| Error::Transform {
            action: Action::Pack,
            game,
            source: Box::new(source),
        })
    }
}

fn apply_mod(walker: &FileWalker, work: &Path) -> Result<()> {
    info!("applying {}", walker.root().display());

    for entry in walker.walk()?.iter() {
        if MOD_METADATA.contains(&entry.path()) {
            continue;
        }

        let source = walker.host_path(entry.path());
        let target = entry_destination(work, entry.path())?;
        debug!("replacing {}", entry.path());

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
        fs::copy(&source, &target).map_err(|e| Error::file(&source, e))?;
    }

    Ok(())
}
