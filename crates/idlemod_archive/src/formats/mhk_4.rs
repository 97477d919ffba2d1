//! Container of *Moorhuhn Kart: Thunder* (`mhk_4`, `data.sar`).
//!
//! | Offset (bytes) | Field        | Description                                       |
//! |----------------|--------------|---------------------------------------------------|
//! | 0x0000         | Magic number | 4 bytes: `SAR\0`                                  |
//! | 0x0004         | Version      | 4 bytes: Fixed value 4                            |
//! | 0x0008         | Entry Count  | 4 bytes: Number of entries in the table           |
//! | 0x000C         | Table Offset | 8 bytes: Offset of the entry table from the start |
//!
//! The payload region starts right after the header and the entry table trails it:
//!
//! | Offset (bytes) | Field        | Description                                       |
//! |----------------|--------------|---------------------------------------------------|
//! | 0x0000         | Name Length  | 2 bytes: Length of the name                       |
//! | 0x0002         | Name         | Name Length bytes: UTF-8 name, `/` separators     |
//! | ...            | Offset       | 8 bytes: Offset of the data from the file start   |
//! | ...            | Size         | 8 bytes: Size of the data                         |
//! | ...            | Checksum     | 4 bytes: CRC-32 (ISO-HDLC) of the data            |

use std::io::{Cursor, Write};

use binrw::{BinRead, BinWrite};
use byteorder::{LittleEndian, WriteBytesExt};
use crc::{Crc, CRC_32_ISO_HDLC};
use tracing::debug;

use crate::error::{CorruptArchiveError, Error, Result};
use crate::formats::table::{PayloadCollector, TableReader};
use crate::formats::{entry_count, ArchiveCodec};
use crate::types::Container;

/// The version of the format written by *Moorhuhn Kart: Thunder*
pub const VERSION: u32 = 4;

/// Longest name the table can hold
pub const MAX_NAME: usize = u16::MAX as usize;

/// Checksum stored with every entry
pub static CHECKSUM: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

const HEADER_SIZE: u64 = 20;
const MIN_ENTRY_SIZE: u64 = 2 + 1 + 8 + 8 + 4;

/// Container header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"SAR\0", little)]
pub struct Mhk4Header {
    /// Format version, always [`VERSION`]
    pub version: u32,

    /// The number of entries in the table
    pub entries: u32,

    /// The offset from the beginning of the file where the entry table starts
    pub table_offset: u64,
}

/// Codec for the *Moorhuhn Kart: Thunder* `data.sar`
#[derive(Debug, Default, Copy, Clone)]
pub struct Mhk4Codec;

impl ArchiveCodec for Mhk4Codec {
    fn encode(&self, container: &Container) -> Result<Vec<u8>> {
        let directory = container.directory();
        let payload = container.payload();

        let header = Mhk4Header {
            version: VERSION,
            entries: entry_count(directory)?,
            table_offset: HEADER_SIZE + payload.len() as u64,
        };

        let mut out = Cursor::new(Vec::with_capacity(
            header.table_offset as usize + directory.len() * MIN_ENTRY_SIZE as usize,
        ));
        header.write(&mut out)?;
        out.write_all(payload)?;

        for (entry, range) in directory.layout() {
            let name = entry.path().as_bytes();
            if name.len() > MAX_NAME {
                return Err(Error::NameTooLong {
                    path: entry.path().to_owned(),
                    max: MAX_NAME,
                });
            }

            let checksum = CHECKSUM.checksum(&payload[range.start as usize..range.end as usize]);

            out.write_u16::<LittleEndian>(name.len() as u16)?;
            out.write_all(name)?;
            out.write_u64::<LittleEndian>(HEADER_SIZE + range.start)?;
            out.write_u64::<LittleEndian>(entry.size())?;
            out.write_u32::<LittleEndian>(checksum)?;
        }

        Ok(out.into_inner())
    }

    fn decode(&self, data: &[u8]) -> Result<Container> {
        let mut header_reader = TableReader::new(data, 0);
        let header =
            Mhk4Header::read(header_reader.cursor()).map_err(CorruptArchiveError::from)?;
        if header.version != VERSION {
            return Err(CorruptArchiveError::UnsupportedVersion(header.version).into());
        }
        debug!(
            entries = header.entries,
            table_offset = header.table_offset,
            "read mhk_4 header"
        );

        if header.table_offset < HEADER_SIZE {
            return Err(CorruptArchiveError::Malformed(format!(
                "entry table starts inside the header at {:#x}",
                header.table_offset
            ))
            .into());
        }

        let mut payload = PayloadCollector::new(data, HEADER_SIZE..header.table_offset)?;
        let mut table = TableReader::new(data, header.table_offset);
        table.ensure_entries(header.entries, MIN_ENTRY_SIZE)?;

        for _ in 0..header.entries {
            let len = table.read_u16()? as usize;
            let name = table.read_name(len)?;
            let offset = table.read_u64()?;
            let size = table.read_u64()?;
            let expected = table.read_u32()?;

            let actual = CHECKSUM.checksum(payload.push(name.clone(), offset, size)?);
            if actual != expected {
                return Err(CorruptArchiveError::ChecksumMismatch {
                    name,
                    expected,
                    actual,
                }
                .into());
            }
        }

        if table.remaining() != 0 {
            return Err(CorruptArchiveError::Malformed(format!(
                "{} trailing bytes after the entry table",
                table.remaining()
            ))
            .into());
        }

        payload.finish()
    }
}
