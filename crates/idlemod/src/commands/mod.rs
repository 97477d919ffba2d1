pub mod list;
pub mod pack;
pub mod packmod;
pub mod unpack;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Pack a directory into the container of a game
    Pack(pack::PackArgs),
    /// Unpack the container of a game into a directory
    Unpack(unpack::UnpackArgs),
    /// List the files stored in a container
    List(list::ListArgs),
    /// Build a container from the original one with mods applied
    Packmod(packmod::PackmodArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Pack(pack) => pack.handle(),
            Commands::Unpack(unpack) => unpack.handle(),
            Commands::List(list) => list.handle(),
            Commands::Packmod(packmod) => packmod.handle(),
        }
    }
}
