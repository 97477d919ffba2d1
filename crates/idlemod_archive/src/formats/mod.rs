//! The container formats of the individual games.
//!
//! Every game stores its data in one container with a header, a table describing the stored
//! files and a payload region holding their bytes. The layouts differ per game; see the module of
//! each format for details.

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use crate::error::{Error, Result};
use crate::types::{ArchiveDirectory, Container, FileEntry};

pub mod mhk_2;
pub mod mhk_3;
pub mod mhk_4;
pub mod mhk_extra;
pub(crate) mod table;

pub use mhk_2::Mhk2Codec;
pub use mhk_3::Mhk3Codec;
pub use mhk_4::Mhk4Codec;
pub use mhk_extra::MhkExtraCodec;

/// Converts between a [`Container`] and the bytes of one container format
pub trait ArchiveCodec {
    /// Serialize `container` into this format
    fn encode(&self, container: &Container) -> Result<Vec<u8>>;

    /// Parse `data`, validating every offset and size against its length
    fn decode(&self, data: &[u8]) -> Result<Container>;
}

/// The games whose containers this crate can read and write
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameVariant {
    /// Moorhuhn Kart: Extra (XXL), the only format with an obfuscated payload
    MhkExtra,
    /// Moorhuhn Kart 2
    Mhk2,
    /// Moorhuhn Kart 3
    Mhk3,
    /// Moorhuhn Kart: Thunder
    Mhk4,
}

impl GameVariant {
    /// Every supported game
    pub const ALL: [GameVariant; 4] = [
        GameVariant::MhkExtra,
        GameVariant::Mhk2,
        GameVariant::Mhk3,
        GameVariant::Mhk4,
    ];

    /// The canonical game id
    pub fn id(self) -> &'static str {
        match self {
            GameVariant::MhkExtra => "mhk_1",
            GameVariant::Mhk2 => "mhk_2",
            GameVariant::Mhk3 => "mhk_3",
            GameVariant::Mhk4 => "mhk_4",
        }
    }

    /// The full name of the game
    pub fn title(self) -> &'static str {
        match self {
            GameVariant::MhkExtra => "Moorhuhn Kart: Extra (XXL)",
            GameVariant::Mhk2 => "Moorhuhn Kart 2",
            GameVariant::Mhk3 => "Moorhuhn Kart 3",
            GameVariant::Mhk4 => "Moorhuhn Kart: Thunder",
        }
    }

    /// The file name the game expects its container under
    pub fn container_name(self) -> &'static str {
        match self {
            GameVariant::MhkExtra => "mhke.dat",
            GameVariant::Mhk2 => "mhk2-00.dat",
            GameVariant::Mhk3 | GameVariant::Mhk4 => "data.sar",
        }
    }

    /// Serialize `container` in the format of this game
    #[instrument(skip(container), fields(entries = container.len()), err)]
    pub fn encode(self, container: &Container) -> Result<Vec<u8>> {
        match self {
            GameVariant::MhkExtra => MhkExtraCodec.encode(container),
            GameVariant::Mhk2 => Mhk2Codec.encode(container),
            GameVariant::Mhk3 => Mhk3Codec.encode(container),
            GameVariant::Mhk4 => Mhk4Codec.encode(container),
        }
    }

    /// Parse a container in the format of this game
    #[instrument(skip(data), fields(size = data.len()), err)]
    pub fn decode(self, data: &[u8]) -> Result<Container> {
        match self {
            GameVariant::MhkExtra => MhkExtraCodec.decode(data),
            GameVariant::Mhk2 => Mhk2Codec.decode(data),
            GameVariant::Mhk3 => Mhk3Codec.decode(data),
            GameVariant::Mhk4 => Mhk4Codec.decode(data),
        }
    }
}

impl FromStr for GameVariant {
    type Err = Error;

    /// Resolve a game id. Regional editions (`mhk_2.en`, `mhk_2.de`) share the container format
    /// of their base game.
    fn from_str(s: &str) -> Result<Self> {
        let base = s.split_once('.').map_or(s, |(base, _)| base);

        match base {
            "mhk_1" | "mhk_extra" => Ok(GameVariant::MhkExtra),
            "mhk_2" => Ok(GameVariant::Mhk2),
            "mhk_3" => Ok(GameVariant::Mhk3),
            "mhk_4" => Ok(GameVariant::Mhk4),
            _ => Err(Error::InvalidGameId(s.to_owned())),
        }
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

pub(crate) fn entry_count(directory: &ArchiveDirectory) -> Result<u32> {
    u32::try_from(directory.len()).map_err(|_| Error::TooManyEntries(directory.len()))
}

pub(crate) fn to_u32(entry: &FileEntry, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::EntryTooLarge {
        path: entry.path().to_owned(),
        size: entry.size(),
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::formats::GameVariant;

    #[test]
    fn resolves_game_ids() -> Result<()> {
        assert_eq!("mhk_1".parse::<GameVariant>()?, GameVariant::MhkExtra);
        assert_eq!("mhk_extra".parse::<GameVariant>()?, GameVariant::MhkExtra);
        assert_eq!("mhk_2".parse::<GameVariant>()?, GameVariant::Mhk2);
        assert_eq!("mhk_2.en".parse::<GameVariant>()?, GameVariant::Mhk2);
        assert_eq!("mhk_2.de".parse::<GameVariant>()?, GameVariant::Mhk2);
        assert_eq!("mhk_3".parse::<GameVariant>()?, GameVariant::Mhk3);
        assert_eq!("mhk_4".parse::<GameVariant>()?, GameVariant::Mhk4);

        Ok(())
    }

    #[test]
    fn rejects_unknown_ids() {
        for id in ["not_a_real_game", "", "MHK_2", "mhk_5", ".mhk_2", "mhk"] {
            assert!(
                matches!(id.parse::<GameVariant>(), Err(Error::InvalidGameId(got)) if got == id),
                "{id:?} was accepted"
            );
        }
    }

    #[test]
    fn ids_round_trip() -> Result<()> {
        for game in GameVariant::ALL {
            assert_eq!(game.to_string().parse::<GameVariant>()?, game);
        }

        Ok(())
    }
}
