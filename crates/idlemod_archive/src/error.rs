//! Error types that can be emitted from this library

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::formats::GameVariant;
use crate::transform::Action;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`] raised by in-memory streams
    #[error(transparent)]
    IOError(#[from] io::Error),

    /// Transparent warpper for [`binrw::Error`] raised while serializing headers
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// A filesystem operation failed on {path}
    #[error("unable to access {}", path.display())]
    FileError {
        /// The file or directory that was being accessed
        path: PathBuf,
        /// The underlying failure
        #[source]
        source: io::Error,
    },

    /// A path below the packed folder is not valid UTF-8
    #[error("{} is not a valid UTF-8 path", .0.display())]
    NonUtf8Path(PathBuf),

    /// A file below the packed folder has a name no archive can hold
    #[error("{0:?} cannot be stored in an archive")]
    #[diagnostic(help("entry names may not contain `\\`, `:` or NUL"))]
    UnsupportedName(String),

    /// The game id does not name a supported game
    #[error("invalid game id `{0}`")]
    #[diagnostic(help("supported games are mhk_1 (mhk_extra), mhk_2, mhk_3 and mhk_4"))]
    InvalidGameId(String),

    /// The archive could not be decoded
    #[error("file is a corrupt archive: {0}")]
    CorruptArchive(#[from] CorruptArchiveError),

    /// The entry name does not fit the name field of the format
    #[error("name of {path} is longer than {max} bytes")]
    NameTooLong {
        /// Entry being packed
        path: String,
        /// Largest encodable name
        max: usize,
    },

    /// The entry is larger than the format can address
    #[error("{path} is too large for this format ({size} bytes)")]
    EntryTooLarge {
        /// Entry being packed
        path: String,
        /// Size of the entry
        size: u64,
    },

    /// More entries than the format can count
    #[error("too many entries for this format ({0})")]
    TooManyEntries(usize),

    /// A mod pack was requested without any mods
    #[error("no mods were selected")]
    NoMods,

    /// Context for a failed pack or unpack
    #[error("unable to {action} {game} archive")]
    Transform {
        /// The attempted action
        action: Action,
        /// The game the archive belongs to
        game: GameVariant,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the path of the file an [`io::Error`] originated from
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileError {
            path: path.into(),
            source,
        }
    }

    /// Returns the innermost error, skipping [`Error::Transform`] context
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Transform { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Error type to provide further information on why an archive was rejected
#[derive(Error, Diagnostic, Debug)]
pub enum CorruptArchiveError {
    /// the file does not start with the expected magic
    #[error("the file does not start with the expected magic")]
    BadMagic,

    /// unsupported version {0}
    #[error("unsupported version {0}")]
    UnsupportedVersion(u32),

    /// the file ended before the archive did
    #[error("the file ended before the archive did")]
    Truncated,

    /// entry {0} points outside of the payload region
    #[error("entry {0} points outside of the payload region")]
    EntryOutOfRange(String),

    /// entry {name} is stored at {offset:#x} instead of {expected:#x}
    #[error("entry {name} is stored at {offset:#x} instead of {expected:#x}")]
    MisplacedEntry {
        /// Entry being read
        name: String,
        /// Offset stored in the entry table
        offset: u64,
        /// Offset following the previous entry
        expected: u64,
    },

    /// payload region holds {actual} bytes but the entries declare {expected}
    #[error("payload region holds {actual} bytes but the entries declare {expected}")]
    PayloadSizeMismatch {
        /// Sum of the entry sizes
        expected: u64,
        /// Length of the payload region
        actual: u64,
    },

    /// entry {0} is stored more than once
    #[error("entry {0} is stored more than once")]
    DuplicateEntry(String),

    /// entry name {0:?} is not a safe relative path
    #[error("entry name {0:?} is not a safe relative path")]
    UnsafePath(String),

    /// an entry name is not valid UTF-8
    #[error("an entry name is not valid UTF-8")]
    InvalidName,

    /// checksum of {name} is {actual:#010x}, expected {expected:#010x}
    #[error("checksum of {name} is {actual:#010x}, expected {expected:#010x}")]
    ChecksumMismatch {
        /// Entry being checked
        name: String,
        /// Checksum stored in the entry table
        expected: u32,
        /// Checksum of the stored bytes
        actual: u32,
    },

    /// {0}
    #[error("{0}")]
    Malformed(String),
}

impl From<binrw::Error> for CorruptArchiveError {
    fn from(err: binrw::Error) -> Self {
        if err.is_eof() {
            return CorruptArchiveError::Truncated;
        }

        match err {
            binrw::Error::BadMagic { .. } => CorruptArchiveError::BadMagic,
            binrw::Error::Backtrace(backtrace) => CorruptArchiveError::from(*backtrace.error),
            other => CorruptArchiveError::Malformed(other.to_string()),
        }
    }
}

impl From<io::Error> for CorruptArchiveError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => CorruptArchiveError::Truncated,
            _ => CorruptArchiveError::Malformed(err.to_string()),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
