use std::path::PathBuf;

use clap::Args;
use idlemod_archive::{transform, Action};
use miette::{Context, Result};

#[derive(Args)]
pub struct UnpackArgs {
    /// The game the container belongs to (mhk_1, mhk_2, mhk_3, mhk_4)
    #[arg(value_name = "GAME")]
    game: String,

    /// An input container
    #[arg(value_name = "FILE")]
    archive: PathBuf,

    /// A target directory, existing files are overwritten
    #[arg(value_name = "DIR")]
    directory: PathBuf,
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        transform(Action::Unpack, &self.game, &self.archive, &self.directory)
            .context(format!("path: {}", self.archive.display()))?;

        Ok(())
    }
}
