//! Bounds-checked helpers for parsing entry tables.

use std::io::{Cursor, Read};
use std::ops::Range;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{CorruptArchiveError, Result};
use crate::path::validate_entry_name;
use crate::types::{ArchiveDirectory, Container, FileEntry};

/// Reads entry table fields, turning a short read into [`CorruptArchiveError::Truncated`]
pub(crate) struct TableReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> TableReader<'a> {
    pub fn new(data: &'a [u8], position: u64) -> Self {
        let mut cursor = Cursor::new(data);
        cursor.set_position(position);
        Self { cursor }
    }

    pub fn cursor(&mut self) -> &mut Cursor<&'a [u8]> {
        &mut self.cursor
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn remaining(&self) -> u64 {
        (self.cursor.get_ref().len() as u64).saturating_sub(self.position())
    }

    /// Reject a count of entries that cannot possibly fit in the remaining bytes
    pub fn ensure_entries(&self, count: u32, min_entry_size: u64) -> Result<()> {
        if count as u64 * min_entry_size > self.remaining() {
            return Err(CorruptArchiveError::Truncated.into());
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.cursor.read_u8().map_err(CorruptArchiveError::from)?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self
            .cursor
            .read_u16::<LittleEndian>()
            .map_err(CorruptArchiveError::from)?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self
            .cursor
            .read_u32::<LittleEndian>()
            .map_err(CorruptArchiveError::from)?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(self
            .cursor
            .read_u64::<LittleEndian>()
            .map_err(CorruptArchiveError::from)?)
    }

    /// Read a name of `len` bytes
    pub fn read_name(&mut self, len: usize) -> Result<String> {
        if len as u64 > self.remaining() {
            return Err(CorruptArchiveError::Truncated.into());
        }

        let mut raw = vec![0u8; len];
        self.cursor
            .read_exact(&mut raw)
            .map_err(CorruptArchiveError::from)?;
        decode_name(raw)
    }

    /// Read a NUL terminated name
    pub fn read_cstr_name(&mut self) -> Result<String> {
        let mut raw = Vec::new();
        loop {
            match self.read_u8()? {
                0 => break,
                byte => raw.push(byte),
            }
        }
        decode_name(raw)
    }
}

/// Decode and validate an entry name
pub(crate) fn decode_name(raw: Vec<u8>) -> Result<String> {
    let name = String::from_utf8(raw).map_err(|_| CorruptArchiveError::InvalidName)?;
    validate_entry_name(&name)?;
    Ok(name)
}

/// Gathers entries stored at explicit offsets into a contiguous [`Container`].
///
/// Entries must follow each other without gaps or overlaps, starting at the beginning of the
/// region, and together fill it exactly. This is the layout every encoder writes.
pub(crate) struct PayloadCollector<'a> {
    data: &'a [u8],
    region: Range<u64>,
    directory: ArchiveDirectory,
    next: u64,
}

impl<'a> PayloadCollector<'a> {
    /// Collect entries that must lie within `region` of `data`
    pub fn new(data: &'a [u8], region: Range<u64>) -> Result<Self> {
        if region.start > region.end || region.end > data.len() as u64 {
            return Err(CorruptArchiveError::Truncated.into());
        }

        Ok(Self {
            data,
            next: region.start,
            region,
            directory: ArchiveDirectory::default(),
        })
    }

    /// Add the entry `name` stored at `offset` and return its bytes
    pub fn push(&mut self, name: String, offset: u64, size: u64) -> Result<&'a [u8]> {
        let end = offset
            .checked_add(size)
            .filter(|end| offset >= self.region.start && *end <= self.region.end)
            .ok_or_else(|| CorruptArchiveError::EntryOutOfRange(name.clone()))?;

        if offset != self.next {
            return Err(CorruptArchiveError::MisplacedEntry {
                name,
                offset,
                expected: self.next,
            }
            .into());
        }

        self.directory.push(FileEntry::new(name, size))?;
        self.next = end;

        Ok(&self.data[offset as usize..end as usize])
    }

    /// Check the entries fill the region and take its bytes as the payload
    pub fn finish(self) -> Result<Container> {
        if self.next != self.region.end {
            return Err(CorruptArchiveError::PayloadSizeMismatch {
                expected: self.next - self.region.start,
                actual: self.region.end - self.region.start,
            }
            .into());
        }

        let payload = self.data[self.region.start as usize..self.region.end as usize].to_vec();
        Container::new(self.directory, payload)
    }
}
