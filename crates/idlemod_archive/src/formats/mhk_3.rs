//! Container of *Moorhuhn Kart 3* (`mhk_3`, `data.sar`).
//!
//! | Offset (bytes) | Field        | Description                                       |
//! |----------------|--------------|---------------------------------------------------|
//! | 0x0000         | Magic number | 4 bytes: `SAR\0`                                  |
//! | 0x0004         | Version      | 4 bytes: Fixed value 3                            |
//! | 0x0008         | Entry Count  | 4 bytes: Number of entries in the table           |
//! | 0x000C         | Table Size   | 4 bytes: Size of the entry table in bytes         |
//!
//! Each entry is a NUL terminated name followed by the 4 byte offset of the data from the start
//! of the file and its 4 byte size. The payload region starts right after the table.

use std::io::{Cursor, Write};

use binrw::{BinRead, BinWrite};
use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use crate::error::{CorruptArchiveError, Error, Result};
use crate::formats::table::{PayloadCollector, TableReader};
use crate::formats::{entry_count, to_u32, ArchiveCodec};
use crate::types::Container;

/// The version of the format written by *Moorhuhn Kart 3*
pub const VERSION: u32 = 3;

const HEADER_SIZE: u64 = 16;
const MIN_ENTRY_SIZE: u64 = 2 + 4 + 4;

/// Container header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"SAR\0", little)]
pub struct Mhk3Header {
    /// Format version, always [`VERSION`]
    pub version: u32,

    /// The number of entries in the table
    pub entries: u32,

    /// The size of the entry table following the header
    pub table_size: u32,
}

/// Codec for the *Moorhuhn Kart 3* `data.sar`
#[derive(Debug, Default, Copy, Clone)]
pub struct Mhk3Codec;

impl ArchiveCodec for Mhk3Codec {
    fn encode(&self, container: &Container) -> Result<Vec<u8>> {
        let directory = container.directory();

        let table_size: u64 = directory
            .iter()
            .map(|entry| entry.path().len() as u64 + 1 + 4 + 4)
            .sum();
        let data_offset = HEADER_SIZE + table_size;

        let header = Mhk3Header {
            version: VERSION,
            entries: entry_count(directory)?,
            table_size: u32::try_from(table_size)
                .map_err(|_| Error::TooManyEntries(directory.len()))?,
        };

        let mut out = Cursor::new(Vec::with_capacity(
            data_offset as usize + container.payload().len(),
        ));
        header.write(&mut out)?;

        for (entry, range) in directory.layout() {
            out.write_all(entry.path().as_bytes())?;
            out.write_u8(0)?;
            out.write_u32::<LittleEndian>(to_u32(entry, data_offset + range.start)?)?;
            out.write_u32::<LittleEndian>(to_u32(entry, entry.size())?)?;
        }

        out.write_all(container.payload())?;

        Ok(out.into_inner())
    }

    fn decode(&self, data: &[u8]) -> Result<Container> {
        let mut table = TableReader::new(data, 0);

        let header = Mhk3Header::read(table.cursor()).map_err(CorruptArchiveError::from)?;
        if header.version != VERSION {
            return Err(CorruptArchiveError::UnsupportedVersion(header.version).into());
        }
        debug!(
            entries = header.entries,
            table_size = header.table_size,
            "read mhk_3 header"
        );

        let data_offset = HEADER_SIZE + header.table_size as u64;
        let mut payload = PayloadCollector::new(data, data_offset..data.len() as u64)?;
        table.ensure_entries(header.entries, MIN_ENTRY_SIZE)?;

        for _ in 0..header.entries {
            let name = table.read_cstr_name()?;
            let offset = table.read_u32()?;
            let size = table.read_u32()?;

            payload.push(name, offset as u64, size as u64)?;
        }

        if table.position() != data_offset {
            return Err(CorruptArchiveError::Malformed(format!(
                "entry table is {} bytes, header declares {}",
                table.position() - HEADER_SIZE,
                header.table_size
            ))
            .into());
        }

        payload.finish()
    }
}
