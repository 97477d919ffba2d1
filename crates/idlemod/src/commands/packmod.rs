use std::path::PathBuf;

use clap::Args;
use idlemod_archive::ModPack;
use miette::{Context, Result};
use tracing::info;

#[derive(Args)]
pub struct PackmodArgs {
    /// The game the container belongs to (mhk_1, mhk_2.en, mhk_2.de, mhk_3, mhk_4)
    #[arg(value_name = "GAME")]
    game: String,

    /// The unmodified container of the game
    #[arg(value_name = "ORIGINAL")]
    original: PathBuf,

    /// The modded container to create
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Mod directories, later ones replace files of earlier ones
    #[arg(value_name = "MOD", required = true)]
    mods: Vec<PathBuf>,
}

impl PackmodArgs {
    pub fn handle(&self) -> Result<()> {
        info!(
            "applying {} mods to {}",
            self.mods.len(),
            self.original.display()
        );

        ModPack::builder()
            .game(&self.game)
            .original(&self.original)
            .output(&self.output)
            .mods(self.mods.clone())
            .build()
            .run()
            .context(format!("creating {}", self.output.display()))?;

        Ok(())
    }
}
