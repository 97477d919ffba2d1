//! Container of *Moorhuhn Kart: Extra* (`mhk_1`, `mhke.dat`).
//!
//! The oldest format: fixed size name records, no offsets and a payload obfuscated with a
//! repeating XOR key.
//!
//! | Offset (bytes) | Field        | Description                                   |
//! |----------------|--------------|-----------------------------------------------|
//! | 0x0000         | Magic number | 8 bytes: `MHKEXTRA`                           |
//! | 0x0008         | Version      | 4 bytes: Fixed value 1                        |
//! | 0x000C         | Entry Count  | 4 bytes: Number of records that follow        |
//! | 0x0010         | Records      | Entry Count * 132 bytes                       |
//!
//! Each record holds a 128 byte NUL padded name using `\` as separator, followed by the 4 byte
//! size of the file. The payload region directly follows the records; files are stored in record
//! order and the region is exactly as long as the sizes add up to. The whole region is XORed with
//! [`KEY`], starting with the first byte of the first file.

use std::io::{Cursor, Write};

use binrw::{BinRead, BinWrite};
use tracing::debug;

use crate::cipher::{self, XorWriter};
use crate::error::{CorruptArchiveError, Error, Result};
use crate::formats::table::{decode_name, TableReader};
use crate::formats::{entry_count, to_u32, ArchiveCodec};
use crate::types::{ArchiveDirectory, Container, FileEntry};

/// Key the payload region is XORed with
pub const KEY: &[u8] = b"phenomedia";

/// The only version of the format
pub const VERSION: u32 = 1;

/// Size of the name field of a record
pub const NAME_SIZE: usize = 128;

const HEADER_SIZE: u64 = 16;
const RECORD_SIZE: u64 = NAME_SIZE as u64 + 4;

/// Container header
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"MHKEXTRA", little)]
pub struct MhkExtraHeader {
    /// Format version, always [`VERSION`]
    pub version: u32,

    /// The number of records following the header
    pub entries: u32,
}

/// A file record
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct MhkExtraRecord {
    /// NUL padded name with `\` separators
    pub name: [u8; NAME_SIZE],

    /// Size of the file
    pub size: u32,
}

impl MhkExtraRecord {
    fn from_entry(entry: &FileEntry) -> Result<Self> {
        if entry.path().contains('\\') {
            return Err(Error::UnsupportedName(entry.path().to_owned()));
        }

        let stored = entry.path().replace('/', "\\");
        if stored.len() >= NAME_SIZE {
            return Err(Error::NameTooLong {
                path: entry.path().to_owned(),
                max: NAME_SIZE - 1,
            });
        }

        let mut name = [0u8; NAME_SIZE];
        name[..stored.len()].copy_from_slice(stored.as_bytes());

        Ok(Self {
            name,
            size: to_u32(entry, entry.size())?,
        })
    }

    fn entry_name(&self) -> Result<String> {
        let len = self
            .name
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(NAME_SIZE);
        let raw = self.name[..len]
            .iter()
            .map(|b| if *b == b'\\' { b'/' } else { *b })
            .collect();
        decode_name(raw)
    }
}

/// Codec for `mhke.dat`
#[derive(Debug, Default, Copy, Clone)]
pub struct MhkExtraCodec;

impl ArchiveCodec for MhkExtraCodec {
    fn encode(&self, container: &Container) -> Result<Vec<u8>> {
        let directory = container.directory();
        let mut out = Cursor::new(Vec::with_capacity(
            (HEADER_SIZE + RECORD_SIZE * directory.len() as u64) as usize
                + container.payload().len(),
        ));

        MhkExtraHeader {
            version: VERSION,
            entries: entry_count(directory)?,
        }
        .write(&mut out)?;

        for entry in directory.iter() {
            MhkExtraRecord::from_entry(entry)?.write(&mut out)?;
        }

        XorWriter::new(&mut out, KEY).write_all(container.payload())?;

        Ok(out.into_inner())
    }

    fn decode(&self, data: &[u8]) -> Result<Container> {
        let mut table = TableReader::new(data, 0);

        let header = MhkExtraHeader::read(table.cursor()).map_err(CorruptArchiveError::from)?;
        if header.version != VERSION {
            return Err(CorruptArchiveError::UnsupportedVersion(header.version).into());
        }
        debug!(entries = header.entries, "read mhk_1 header");

        table.ensure_entries(header.entries, RECORD_SIZE)?;

        let mut directory = ArchiveDirectory::with_capacity(header.entries as usize);
        for _ in 0..header.entries {
            let record =
                MhkExtraRecord::read(table.cursor()).map_err(CorruptArchiveError::from)?;
            directory.push(FileEntry::new(record.entry_name()?, record.size as u64))?;
        }

        let mut payload = data[table.position() as usize..].to_vec();
        cipher::apply_in_place(&mut payload, KEY);

        Container::new(directory, payload)
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::error::{CorruptArchiveError, Error, Result};
    use crate::formats::mhk_extra::{MhkExtraCodec, MhkExtraHeader, MhkExtraRecord, NAME_SIZE};
    use crate::formats::ArchiveCodec;
    use crate::types::{ArchiveDirectory, Container, FileEntry};

    fn hello_container() -> Result<Container> {
        let mut directory = ArchiveDirectory::default();
        directory.push(FileEntry::new("sub/hi.txt", 2))?;
        Container::new(directory, b"Hi".to_vec())
    }

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x4D, 0x48, 0x4B, 0x45, 0x58, 0x54, 0x52, 0x41,
            0x01, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
        ]);

        let expected = MhkExtraHeader {
            version: 1,
            entries: 2,
        };

        assert_eq!(
            MhkExtraHeader::read(&mut input).map_err(CorruptArchiveError::from)?,
            expected
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn write_single_entry() -> Result<()> {
        let actual = MhkExtraCodec.encode(&hello_container()?)?;

        let mut expected = vec![
            // Header
            0x4D, 0x48, 0x4B, 0x45, 0x58, 0x54, 0x52, 0x41, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00,
            0x00, 0x00,
        ];
        // Record
        let mut name = [0u8; NAME_SIZE];
        name[..10].copy_from_slice(b"sub\\hi.txt");
        expected.extend_from_slice(&name);
        expected.extend_from_slice(&[0x02, 0x00, 0x00, 0x00]);
        // Payload, "Hi" XOR "ph"
        expected.extend_from_slice(&[b'H' ^ b'p', b'i' ^ b'h']);

        assert_eq!(actual.len(), expected.len());
        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", expected));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_single_entry() -> Result<()> {
        let data = MhkExtraCodec.encode(&hello_container()?)?;
        let container = MhkExtraCodec.decode(&data)?;

        assert_eq!(container, hello_container()?);
        assert_eq!(container.by_name("sub/hi.txt"), Some(&b"Hi"[..]));

        Ok(())
    }

    #[test]
    fn read_invalid_magic() -> Result<()> {
        let mut data = MhkExtraCodec.encode(&hello_container()?)?;
        data[0] = 0x40;

        assert!(matches!(
            MhkExtraCodec.decode(&data),
            Err(Error::CorruptArchive(CorruptArchiveError::BadMagic))
        ));

        Ok(())
    }

    #[test]
    fn read_unsupported_version() -> Result<()> {
        let mut data = MhkExtraCodec.encode(&hello_container()?)?;
        data[8] = 0x02;

        assert!(matches!(
            MhkExtraCodec.decode(&data),
            Err(Error::CorruptArchive(CorruptArchiveError::UnsupportedVersion(2)))
        ));

        Ok(())
    }

    #[test]
    fn read_trailing_payload() -> Result<()> {
        let mut data = MhkExtraCodec.encode(&hello_container()?)?;
        data.push(0x00);

        assert!(matches!(
            MhkExtraCodec.decode(&data),
            Err(Error::CorruptArchive(
                CorruptArchiveError::PayloadSizeMismatch { .. }
            ))
        ));

        Ok(())
    }

    #[test]
    fn write_rejects_long_names() -> Result<()> {
        let name = format!("{}a", "a/".repeat(64));
        let mut directory = ArchiveDirectory::default();
        directory.push(FileEntry::new(name, 0))?;

        assert!(matches!(
            MhkExtraCodec.encode(&Container::new(directory, Vec::new())?),
            Err(Error::NameTooLong { max: 127, .. })
        ));

        Ok(())
    }

    #[test]
    fn write_rejects_backslash_names() -> Result<()> {
        let mut directory = ArchiveDirectory::default();
        directory.push(FileEntry::new("a\\b.txt", 0))?;

        assert!(matches!(
            MhkExtraCodec.encode(&Container::new(directory, Vec::new())?),
            Err(Error::UnsupportedName(name)) if name == "a\\b.txt"
        ));

        Ok(())
    }

    #[test]
    fn record_round_trip_keeps_separators() -> Result<()> {
        let record = MhkExtraRecord::from_entry(&FileEntry::new("tracks/01/sky.tga", 7))?;

        let mut raw = Vec::new();
        record.write(&mut Cursor::new(&mut raw))?;
        assert_eq!(&raw[..17], b"tracks\\01\\sky.tga");

        assert_eq!(record.entry_name()?, "tracks/01/sky.tga");

        Ok(())
    }
}
