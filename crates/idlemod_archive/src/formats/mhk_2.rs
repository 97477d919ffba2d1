//! Container of *Moorhuhn Kart 2* (`mhk_2`, `mhk2-00.dat`).
//!
//! | Offset (bytes) | Field        | Description                                            |
//! |----------------|--------------|--------------------------------------------------------|
//! | 0x0000         | Magic number | 4 bytes: `MHK2`                                        |
//! | 0x0004         | Version      | 4 bytes: Fixed value 2                                 |
//! | 0x0008         | Entry Count  | 4 bytes: Number of entries in the table                |
//! | 0x000C         | Data Offset  | 4 bytes: Offset of the payload region from file start  |
//!
//! The entry table follows the header:
//!
//! | Offset (bytes) | Field        | Description                                            |
//! |----------------|--------------|--------------------------------------------------------|
//! | 0x0000         | Name Length  | 1 byte: Length of the name                             |
//! | 0x0001         | Name         | Name Length bytes: UTF-8 name using `/` separators     |
//! | ...            | Offset       | 4 bytes: Offset of the data from the payload region    |
//! | ...            | Size         | 4 bytes: Size of the data                              |

use std::io::{Cursor, Write};

use binrw::{BinRead, BinWrite};
use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use crate::error::{CorruptArchiveError, Error, Result};
use crate::formats::table::{PayloadCollector, TableReader};
use crate::formats::{entry_count, to_u32, ArchiveCodec};
use crate::types::Container;

/// The only version of the format
pub const VERSION: u32 = 2;

/// Longest name the table can hold
pub const MAX_NAME: usize = u8::MAX as usize;

const HEADER_SIZE: u64 = 16;
const MIN_ENTRY_SIZE: u64 = 1 + 1 + 4 + 4;

/// Container header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"MHK2", little)]
pub struct Mhk2Header {
    /// Format version, always [`VERSION`]
    pub version: u32,

    /// The number of entries in the table
    pub entries: u32,

    /// The offset from the beginning of the file where the payload region starts
    pub data_offset: u32,
}

/// Codec for `mhk2-00.dat`
#[derive(Debug, Default, Copy, Clone)]
pub struct Mhk2Codec;

impl ArchiveCodec for Mhk2Codec {
    fn encode(&self, container: &Container) -> Result<Vec<u8>> {
        let directory = container.directory();

        let mut table = Vec::new();
        for (entry, range) in directory.layout() {
            let name = entry.path().as_bytes();
            if name.len() > MAX_NAME {
                return Err(Error::NameTooLong {
                    path: entry.path().to_owned(),
                    max: MAX_NAME,
                });
            }

            table.write_u8(name.len() as u8)?;
            table.write_all(name)?;
            table.write_u32::<LittleEndian>(to_u32(entry, range.start)?)?;
            table.write_u32::<LittleEndian>(to_u32(entry, entry.size())?)?;
        }

        let data_offset = HEADER_SIZE + table.len() as u64;
        let header = Mhk2Header {
            version: VERSION,
            entries: entry_count(directory)?,
            data_offset: u32::try_from(data_offset)
                .map_err(|_| Error::TooManyEntries(directory.len()))?,
        };

        let mut out = Cursor::new(Vec::with_capacity(
            data_offset as usize + container.payload().len(),
        ));
        header.write(&mut out)?;
        out.write_all(&table)?;
        out.write_all(container.payload())?;

        Ok(out.into_inner())
    }

    fn decode(&self, data: &[u8]) -> Result<Container> {
        let mut table = TableReader::new(data, 0);

        let header = Mhk2Header::read(table.cursor()).map_err(CorruptArchiveError::from)?;
        if header.version != VERSION {
            return Err(CorruptArchiveError::UnsupportedVersion(header.version).into());
        }
        debug!(
            entries = header.entries,
            data_offset = header.data_offset,
            "read mhk_2 header"
        );

        let data_offset = header.data_offset as u64;
        if data_offset < HEADER_SIZE {
            return Err(CorruptArchiveError::Malformed(format!(
                "payload region starts inside the header at {data_offset:#x}"
            ))
            .into());
        }

        let mut payload = PayloadCollector::new(data, data_offset..data.len() as u64)?;
        table.ensure_entries(header.entries, MIN_ENTRY_SIZE)?;

        for _ in 0..header.entries {
            let len = table.read_u8()? as usize;
            let name = table.read_name(len)?;
            let offset = table.read_u32()? as u64;
            let size = table.read_u32()? as u64;

            let start = data_offset
                .checked_add(offset)
                .ok_or_else(|| CorruptArchiveError::EntryOutOfRange(name.clone()))?;
            payload.push(name, start, size)?;
        }

        if table.position() > data_offset {
            return Err(CorruptArchiveError::Malformed(
                "entry table overlaps the payload region".into(),
            )
            .into());
        }

        payload.finish()
    }
}
