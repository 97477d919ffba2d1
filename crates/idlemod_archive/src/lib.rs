//! This library packs and unpacks the data containers of the *Moorhuhn Kart* games.
//!
//! # Containers
//!
//! Every game of the series ships its assets (videos, textures, tracks, scripts) in one container
//! file. All containers share the same structure:
//!
//! - a **header** with a magic number, a version and the number of stored files,
//! - a **directory table** listing the path and size of every file, and where the format has
//!   them, the offset of its data,
//! - a **payload region** holding the bytes of every file, stored in directory order.
//!
//! The layouts differ per game:
//!
//! | Game id              | Container     | Module                      | Notes                                 |
//! |----------------------|---------------|-----------------------------|---------------------------------------|
//! | `mhk_1`, `mhk_extra` | `mhke.dat`    | [`formats::mhk_extra`]      | fixed size names, XORed payload       |
//! | `mhk_2`              | `mhk2-00.dat` | [`formats::mhk_2`]          | offsets relative to the payload       |
//! | `mhk_3`              | `data.sar`    | [`formats::mhk_3`]          | NUL terminated names, absolute offsets|
//! | `mhk_4`              | `data.sar`    | [`formats::mhk_4`]          | trailing table, checksums             |
//!
//! Regional editions such as `mhk_2.en` or `mhk_2.de` use the container of their base game.
//!
//! The XOR key of `mhk_1` ([`formats::mhk_extra::KEY`]) only obfuscates the payload; it does not
//! protect it.
//!
//! # Transforming
//!
//! [`transform`] is the single entry point for packing a folder into a container and unpacking a
//! container into a folder. Packing walks the folder with a [`FileWalker`] in path order, so an
//! unchanged folder always packs into identical bytes. Unpacking validates every offset and size
//! against the container before any file is written and refuses entry names that would escape
//! the target folder.
//!
//! ```no_run
//! # fn doit() -> idlemod_archive::error::Result<()> {
//! use std::path::Path;
//! use idlemod_archive::{transform, Action};
//!
//! transform(Action::Unpack, "mhk_3", Path::new("data.sar"), Path::new("unpacked"))?;
//! # Ok(())
//! # }
//! ```
//!
//! [`ModPack`] builds on top of that to apply mod folders to the original container of a game.

pub mod cipher;
pub mod error;
pub mod extract;
pub mod formats;
pub mod modpack;
pub mod path;
pub mod transform;
pub mod types;
pub mod walk;

pub use formats::{ArchiveCodec, GameVariant};
pub use modpack::ModPack;
pub use transform::{transform, Action};
pub use types::{ArchiveDirectory, Container, FileEntry};
pub use walk::FileWalker;
