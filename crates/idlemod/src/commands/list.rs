use std::path::PathBuf;

use clap::Args;
use idlemod_archive::{transform::read_archive, GameVariant};
use miette::{Context, Result};
use owo_colors::OwoColorize;

#[derive(Args)]
pub struct ListArgs {
    /// The game the container belongs to (mhk_1, mhk_2, mhk_3, mhk_4)
    #[arg(value_name = "GAME")]
    game: String,

    /// An input container
    #[arg(value_name = "FILE")]
    archive: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let game: GameVariant = self.game.parse()?;
        let container = read_archive(game, &self.archive)
            .context(format!("path: {}", self.archive.display()))?;

        println!(
            "{} ({}), {} files",
            self.archive.display().bold(),
            game.title(),
            container.len()
        );
        for entry in container.directory() {
            println!("{:>12} {}", entry.size().dimmed(), entry.path().green());
        }

        Ok(())
    }
}
