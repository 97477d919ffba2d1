use std::path::PathBuf;

use clap::Args;
use idlemod_archive::{transform, Action};
use miette::{Context, Result};
use tracing::info;

#[derive(Args)]
pub struct PackArgs {
    /// The game the container belongs to (mhk_1, mhk_2, mhk_3, mhk_4)
    #[arg(value_name = "GAME")]
    game: String,

    /// The container to create
    #[arg(value_name = "FILE")]
    archive: PathBuf,

    /// The directory to pack
    #[arg(value_name = "DIR")]
    directory: PathBuf,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", self.archive.display());

        transform(Action::Pack, &self.game, &self.archive, &self.directory)
            .context(format!("packing {}", self.directory.display()))?;

        Ok(())
    }
}
