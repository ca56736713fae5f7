use byteorder::{LittleEndian, WriteBytesExt};

use anyhow::Result;

/// ZIP compression methods permitted by the ISO/IEC 21320-1 subset.
///
/// The document-container profile restricts archives to these two methods;
/// no other method value is ever emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
}

impl CompressionMethod {
    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
        }
    }

    /// Minimum "version needed to extract" for this method.
    ///
    /// Deflate requires PKZIP 2.0 (20); stored entries only need 1.0 (10).
    pub fn version_needed(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 10,
            CompressionMethod::Deflate => 20,
        }
    }
}

/// "Version made by" field: Unix host (3), spec version 3.0 (30).
pub const VERSION_MADE_BY: u16 = 0x031E;

/// External attributes for a Unix regular file with 0644 permissions.
pub const EXTERNAL_ATTRS_UNIX_FILE: u32 = 0x81A4_0000;

/// The DOS timestamp minimum: 1980-01-01 00:00:00.
///
/// Entries are stamped with this epoch unless the caller supplies a real
/// modification time.
pub const DOS_EPOCH_TIME: u16 = 0;
pub const DOS_EPOCH_DATE: u16 = (1 << 5) | 1;

/// Pack an MS-DOS time field: hour/minute and two-second granularity.
pub fn dos_time(hour: u8, minute: u8, second: u8) -> u16 {
    ((hour as u16) << 11) | ((minute as u16) << 5) | (second as u16 / 2)
}

/// Pack an MS-DOS date field; years count from 1980.
pub fn dos_date(year: u16, month: u8, day: u8) -> u16 {
    ((year.saturating_sub(1980)) << 9) | ((month as u16) << 5) | (day as u16)
}

/// Local File Header (LFH) - 30 bytes + filename
///
/// Written immediately before each entry's (possibly compressed) data.
pub struct LocalFileHeader<'a> {
    pub method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name: &'a str,
}

impl LocalFileHeader<'_> {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(Self::SIGNATURE);
        buf.write_u16::<LittleEndian>(self.method.version_needed())?;
        buf.write_u16::<LittleEndian>(0)?; // general purpose bit flags
        buf.write_u16::<LittleEndian>(self.method.as_u16())?;
        buf.write_u16::<LittleEndian>(self.last_mod_time)?;
        buf.write_u16::<LittleEndian>(self.last_mod_date)?;
        buf.write_u32::<LittleEndian>(self.crc32)?;
        buf.write_u32::<LittleEndian>(self.compressed_size)?;
        buf.write_u32::<LittleEndian>(self.uncompressed_size)?;
        buf.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        buf.write_u16::<LittleEndian>(0)?; // extra field length
        buf.extend_from_slice(self.file_name.as_bytes());
        Ok(())
    }
}

/// Central Directory File Header (CDFH) - 46 bytes + filename
///
/// One per entry, written in the trailing central directory. Carries the
/// same method/time/CRC/size fields as the LFH plus the byte offset where
/// that entry's local header begins.
pub struct CentralDirectoryHeader<'a> {
    pub method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub lfh_offset: u32,
    pub file_name: &'a str,
}

impl CentralDirectoryHeader<'_> {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(Self::SIGNATURE);
        buf.write_u16::<LittleEndian>(VERSION_MADE_BY)?;
        buf.write_u16::<LittleEndian>(self.method.version_needed())?;
        buf.write_u16::<LittleEndian>(0)?; // general purpose bit flags
        buf.write_u16::<LittleEndian>(self.method.as_u16())?;
        buf.write_u16::<LittleEndian>(self.last_mod_time)?;
        buf.write_u16::<LittleEndian>(self.last_mod_date)?;
        buf.write_u32::<LittleEndian>(self.crc32)?;
        buf.write_u32::<LittleEndian>(self.compressed_size)?;
        buf.write_u32::<LittleEndian>(self.uncompressed_size)?;
        buf.write_u16::<LittleEndian>(self.file_name.len() as u16)?;
        buf.write_u16::<LittleEndian>(0)?; // extra field length
        buf.write_u16::<LittleEndian>(0)?; // file comment length
        buf.write_u16::<LittleEndian>(0)?; // disk number start
        buf.write_u16::<LittleEndian>(0)?; // internal file attributes
        buf.write_u32::<LittleEndian>(EXTERNAL_ATTRS_UNIX_FILE)?;
        buf.write_u32::<LittleEndian>(self.lfh_offset)?;
        buf.extend_from_slice(self.file_name.as_bytes());
        Ok(())
    }
}

/// End of Central Directory (EOCD) - 22 bytes
///
/// Fixed-format trailer that locates the central directory. Single-volume
/// only: both disk fields are zero and the two entry counts are equal.
pub struct EndOfCentralDirectory {
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn write_to(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.extend_from_slice(Self::SIGNATURE);
        buf.write_u16::<LittleEndian>(0)?; // this disk
        buf.write_u16::<LittleEndian>(0)?; // disk with central directory
        buf.write_u16::<LittleEndian>(self.total_entries)?;
        buf.write_u16::<LittleEndian>(self.total_entries)?;
        buf.write_u32::<LittleEndian>(self.cd_size)?;
        buf.write_u32::<LittleEndian>(self.cd_offset)?;
        buf.write_u16::<LittleEndian>(0)?; // comment length
        Ok(())
    }
}
