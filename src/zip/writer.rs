//! ZIP archive assembly.
//!
//! This module builds the container byte stream from an ordered list of
//! entries, writing to an in-memory buffer.
//!
//! ## Writing Strategy
//!
//! ZIP files are written front to back in three passes:
//! 1. Resolve every entry: checksum the uncompressed bytes and decide
//!    between STORED and DEFLATE based on measured output size
//! 2. Append each Local File Header followed by the entry's payload,
//!    recording the offset where each header begins
//! 3. Append the Central Directory (which embeds those offsets) and the
//!    End of Central Directory record
//!
//! The central directory can only be written after all local headers, as
//! each of its records points back at a final local-header offset.

use std::io::Write;

use flate2::{Compression, write::DeflateEncoder};

use anyhow::{Result, anyhow, bail};

use super::crc32::crc32;
use super::structures::{
    CentralDirectoryHeader, CompressionMethod, DOS_EPOCH_DATE, DOS_EPOCH_TIME,
    EndOfCentralDirectory, LocalFileHeader,
};

/// An entry as supplied by the caller, retained untouched until `finish`.
struct PendingEntry {
    file_name: String,
    data: Vec<u8>,
    compress: bool,
    last_mod_time: u16,
    last_mod_date: u16,
}

/// An entry after resolution: checksummed, with its final method and payload.
///
/// Invariant: `method` is `Deflate` only when `payload` is strictly smaller
/// than the original data; otherwise `payload` holds the original bytes
/// verbatim.
struct ResolvedEntry {
    file_name: String,
    method: CompressionMethod,
    crc32: u32,
    uncompressed_size: u32,
    payload: Vec<u8>,
    last_mod_time: u16,
    last_mod_date: u16,
}

/// Incremental ZIP archive builder.
///
/// Entries appear in the output in the exact order they were added; the
/// writer never reorders or deduplicates. This matters for formats like
/// EPUB, where `mimetype` must be the first entry and must be stored
/// uncompressed.
///
/// ## Example
///
/// ```
/// use doczip::ZipWriter;
///
/// # fn main() -> anyhow::Result<()> {
/// let mut writer = ZipWriter::new();
/// writer.add_text("mimetype", "application/epub+zip", false);
/// writer.add_text("META-INF/container.xml", "<container/>", true);
/// let archive = writer.finish()?;
/// assert_eq!(&archive[0..2], b"PK");
/// # Ok(())
/// # }
/// ```
pub struct ZipWriter {
    entries: Vec<PendingEntry>,
}

impl ZipWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a file entry with the default (DOS epoch) timestamp.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Archive-relative path, forward-slash separated
    /// * `data` - The entry's content; never modified by the writer
    /// * `compress` - Request DEFLATE if it actually shrinks the data
    ///
    /// Adding is cheap: no checksum or compression work happens until
    /// [`finish()`](Self::finish). Path uniqueness is not checked; adding
    /// the same name twice produces two entries with that name.
    pub fn add(&mut self, file_name: impl Into<String>, data: Vec<u8>, compress: bool) {
        self.add_with_mod_time(file_name, data, compress, DOS_EPOCH_TIME, DOS_EPOCH_DATE);
    }

    /// Append a file entry with an explicit MS-DOS modification timestamp.
    ///
    /// See [`dos_time`](super::structures::dos_time) and
    /// [`dos_date`](super::structures::dos_date) for packing the fields.
    pub fn add_with_mod_time(
        &mut self,
        file_name: impl Into<String>,
        data: Vec<u8>,
        compress: bool,
        last_mod_time: u16,
        last_mod_date: u16,
    ) {
        self.entries.push(PendingEntry {
            file_name: file_name.into(),
            data,
            compress,
            last_mod_time,
            last_mod_date,
        });
    }

    /// Append a UTF-8 text entry; convenience over [`add()`](Self::add).
    pub fn add_text(&mut self, file_name: impl Into<String>, text: &str, compress: bool) {
        self.add(file_name, text.as_bytes().to_vec(), compress);
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the writer and produce the complete archive byte stream.
    ///
    /// Performs all deferred work: CRC-32 over every entry, DEFLATE for
    /// entries that requested it, then the serialization passes described
    /// in the module docs. Taking `self` by value makes reuse after
    /// finishing impossible.
    ///
    /// # Errors
    ///
    /// Fails if any size or offset overflows the format's 32-bit fields
    /// (ZIP64 is not supported) or if the entry count exceeds the 16-bit
    /// single-volume limit.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.entries.len() > u16::MAX as usize {
            bail!(
                "too many entries for a single-volume archive: {} (max {})",
                self.entries.len(),
                u16::MAX
            );
        }
        let total_entries = self.entries.len() as u16;

        // Pass 1: resolve entries (checksum + compression decision).
        // Each resolution is independent of every other entry.
        let resolved = self
            .entries
            .into_iter()
            .map(resolve_entry)
            .collect::<Result<Vec<_>>>()?;

        // Pass 2: local headers and payloads, tracking header offsets.
        let mut out = Vec::new();
        let mut lfh_offsets = Vec::with_capacity(resolved.len());

        for entry in &resolved {
            let offset = checked_u32(out.len(), "local header offset")?;
            lfh_offsets.push(offset);

            let header = LocalFileHeader {
                method: entry.method,
                last_mod_time: entry.last_mod_time,
                last_mod_date: entry.last_mod_date,
                crc32: entry.crc32,
                compressed_size: entry.payload.len() as u32,
                uncompressed_size: entry.uncompressed_size,
                file_name: &entry.file_name,
            };
            header.write_to(&mut out)?;
            out.extend_from_slice(&entry.payload);
        }

        // Pass 3: central directory, then the EOCD trailer.
        let cd_offset = checked_u32(out.len(), "central directory offset")?;
        let mut cd = Vec::new();

        for (entry, lfh_offset) in resolved.iter().zip(&lfh_offsets) {
            let header = CentralDirectoryHeader {
                method: entry.method,
                last_mod_time: entry.last_mod_time,
                last_mod_date: entry.last_mod_date,
                crc32: entry.crc32,
                compressed_size: entry.payload.len() as u32,
                uncompressed_size: entry.uncompressed_size,
                lfh_offset: *lfh_offset,
                file_name: &entry.file_name,
            };
            header.write_to(&mut cd)?;
        }

        let cd_size = checked_u32(cd.len(), "central directory size")?;
        out.extend_from_slice(&cd);

        let eocd = EndOfCentralDirectory {
            total_entries,
            cd_size,
            cd_offset,
        };
        eocd.write_to(&mut out)?;

        Ok(out)
    }
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a pending entry: checksum it and pick the final method.
///
/// DEFLATE output is kept only when strictly smaller than the original;
/// ties fall back to STORED. The caller's `compress` request is advisory,
/// measured size has the final say.
fn resolve_entry(entry: PendingEntry) -> Result<ResolvedEntry> {
    let crc32 = crc32(&entry.data);
    let uncompressed_size = checked_u32(entry.data.len(), "entry size")?;

    if entry.compress && !entry.data.is_empty() {
        let deflated = deflate(&entry.data)?;
        if deflated.len() < entry.data.len() {
            return Ok(ResolvedEntry {
                file_name: entry.file_name,
                method: CompressionMethod::Deflate,
                crc32,
                uncompressed_size,
                payload: deflated,
                last_mod_time: entry.last_mod_time,
                last_mod_date: entry.last_mod_date,
            });
        }
    }

    Ok(ResolvedEntry {
        file_name: entry.file_name,
        method: CompressionMethod::Stored,
        crc32,
        uncompressed_size,
        payload: entry.data,
        last_mod_time: entry.last_mod_time,
        last_mod_date: entry.last_mod_date,
    })
}

/// Compress `data` into a raw DEFLATE stream (RFC 1951, no zlib wrapper)
/// at the default balanced level.
fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len()), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Narrow a buffer length to the format's 32-bit fields.
fn checked_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| anyhow!("{what} exceeds the 4 GiB ZIP limit (no ZIP64 support)"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::structures::{dos_date, dos_time};

    fn le16(buf: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([buf[offset], buf[offset + 1]])
    }

    fn le32(buf: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            buf[offset],
            buf[offset + 1],
            buf[offset + 2],
            buf[offset + 3],
        ])
    }

    /// Deterministic pseudo-random bytes that DEFLATE cannot shrink.
    fn incompressible(len: usize) -> Vec<u8> {
        let mut state = 0x2545F491_4F6CDD1D_u64;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 33) as u8
            })
            .collect()
    }

    /// Walk the central directory, returning (file_name, lfh_offset) pairs
    /// in on-disk order.
    fn central_directory(archive: &[u8]) -> Vec<(String, u32)> {
        let eocd_start = archive.len() - EndOfCentralDirectory::SIZE;
        assert_eq!(
            &archive[eocd_start..eocd_start + 4],
            EndOfCentralDirectory::SIGNATURE
        );
        let total_entries = le16(archive, eocd_start + 10) as usize;
        let cd_offset = le32(archive, eocd_start + 16) as usize;

        let mut entries = Vec::with_capacity(total_entries);
        let mut pos = cd_offset;
        for _ in 0..total_entries {
            assert_eq!(&archive[pos..pos + 4], CentralDirectoryHeader::SIGNATURE);
            let name_len = le16(archive, pos + 28) as usize;
            let lfh_offset = le32(archive, pos + 42);
            let name =
                String::from_utf8(archive[pos + 46..pos + 46 + name_len].to_vec()).unwrap();
            entries.push((name, lfh_offset));
            pos += CentralDirectoryHeader::SIZE + name_len;
        }
        entries
    }

    #[test]
    fn test_empty_archive_is_bare_eocd() {
        let archive = ZipWriter::new().finish().unwrap();

        assert_eq!(archive.len(), EndOfCentralDirectory::SIZE);
        assert_eq!(&archive[0..4], b"PK\x05\x06");
        assert_eq!(le16(&archive, 10), 0); // total entries
        assert_eq!(le32(&archive, 12), 0); // central directory size
        assert_eq!(le32(&archive, 16), 0); // central directory offset
    }

    #[test]
    fn test_single_stored_entry() {
        let data = b"hello world".to_vec();
        let mut writer = ZipWriter::new();
        writer.add("hello.txt", data.clone(), false);
        let archive = writer.finish().unwrap();

        assert_eq!(&archive[0..4], b"PK\x03\x04");
        assert_eq!(le16(&archive, 8), 0); // method: stored
        assert_eq!(le32(&archive, 18), data.len() as u32); // compressed size
        assert_eq!(le32(&archive, 22), data.len() as u32); // uncompressed size
        assert_eq!(le16(&archive, 26), 9); // filename length

        // Payload follows the header and filename, byte for byte
        let data_start = LocalFileHeader::SIZE + 9;
        assert_eq!(&archive[data_start..data_start + data.len()], &data[..]);
    }

    #[test]
    fn test_compression_shrinks_repetitive_input() {
        let data = "the quick brown fox ".repeat(65).into_bytes();
        assert_eq!(data.len(), 1300);

        let mut writer = ZipWriter::new();
        writer.add("repeat.txt", data, true);
        let archive = writer.finish().unwrap();

        assert!(archive.len() < 1300, "archive is {} bytes", archive.len());
        assert_eq!(le16(&archive, 8), 8); // method: deflate
        assert_eq!(le16(&archive, 4), 20); // version needed for deflate
    }

    #[test]
    fn test_incompressible_input_falls_back_to_stored() {
        let data = incompressible(4096);
        let mut writer = ZipWriter::new();
        writer.add("noise.bin", data.clone(), true);
        let archive = writer.finish().unwrap();

        // Compression was requested but did not help, so the entry is
        // stored and the payload is the original bytes unchanged
        assert_eq!(le16(&archive, 8), 0);
        assert_eq!(le32(&archive, 18), 4096);
        assert_eq!(le32(&archive, 22), 4096);

        let data_start = LocalFileHeader::SIZE + "noise.bin".len();
        assert_eq!(&archive[data_start..data_start + 4096], &data[..]);
    }

    #[test]
    fn test_empty_entry_is_stored_with_zero_crc() {
        let mut writer = ZipWriter::new();
        writer.add("empty", Vec::new(), true);
        let archive = writer.finish().unwrap();

        assert_eq!(le16(&archive, 8), 0); // stored, never deflated
        assert_eq!(le32(&archive, 14), 0); // crc32 of empty input
        assert_eq!(le32(&archive, 18), 0);
        assert_eq!(le32(&archive, 22), 0);
    }

    #[test]
    fn test_central_directory_order_and_offsets() {
        let mut writer = ZipWriter::new();
        writer.add("first.txt", b"aaaa".to_vec(), false);
        writer.add("second/nested.xml", "<x/>".repeat(100).into_bytes(), true);
        writer.add("third.bin", incompressible(64), true);
        let archive = writer.finish().unwrap();

        let entries = central_directory(&archive);
        assert_eq!(entries.len(), 3);

        // Central directory preserves insertion order
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["first.txt", "second/nested.xml", "third.bin"]);

        // Every recorded offset points at a local header signature
        for (_, offset) in &entries {
            let pos = *offset as usize;
            assert_eq!(&archive[pos..pos + 4], LocalFileHeader::SIGNATURE);
        }

        // First entry starts at the very beginning of the stream
        assert_eq!(entries[0].1, 0);
    }

    #[test]
    fn test_local_and_central_fields_agree() {
        let data = b"some moderately interesting content".to_vec();
        let expected_crc = crc32(&data);

        let mut writer = ZipWriter::new();
        writer.add("a.txt", data.clone(), false);
        let archive = writer.finish().unwrap();

        let (_, lfh_offset) = central_directory(&archive)[0].clone();
        let lfh = lfh_offset as usize;
        let eocd_start = archive.len() - EndOfCentralDirectory::SIZE;
        let cd = le32(&archive, eocd_start + 16) as usize;

        // crc32: LFH offset 14, CDFH offset 16
        assert_eq!(le32(&archive, lfh + 14), expected_crc);
        assert_eq!(le32(&archive, cd + 16), expected_crc);
        // uncompressed size: LFH offset 22, CDFH offset 24
        assert_eq!(le32(&archive, lfh + 22), data.len() as u32);
        assert_eq!(le32(&archive, cd + 24), data.len() as u32);
    }

    #[test]
    fn test_epub_mimetype_stays_first_and_stored() {
        let mut writer = ZipWriter::new();
        writer.add_text("mimetype", "application/epub+zip", false);
        writer.add_text(
            "META-INF/container.xml",
            "<?xml version=\"1.0\"?><container/>",
            true,
        );
        let archive = writer.finish().unwrap();

        // The first local header is the mimetype entry, stored verbatim
        assert_eq!(&archive[0..4], b"PK\x03\x04");
        assert_eq!(le16(&archive, 8), 0);
        assert_eq!(&archive[30..38], b"mimetype");
        assert_eq!(&archive[38..58], b"application/epub+zip");

        let entries = central_directory(&archive);
        assert_eq!(entries[0].0, "mimetype");
        assert_eq!(entries[1].0, "META-INF/container.xml");
    }

    #[test]
    fn test_explicit_mod_time_is_recorded() {
        let time = dos_time(13, 45, 58);
        let date = dos_date(2024, 6, 15);

        let mut writer = ZipWriter::new();
        writer.add_with_mod_time("dated.txt", b"x".to_vec(), false, time, date);
        let archive = writer.finish().unwrap();

        assert_eq!(le16(&archive, 10), time); // LFH mod time
        assert_eq!(le16(&archive, 12), date); // LFH mod date
    }

    #[test]
    fn test_duplicate_paths_are_kept_as_two_entries() {
        let mut writer = ZipWriter::new();
        writer.add("same.txt", b"one".to_vec(), false);
        writer.add("same.txt", b"two".to_vec(), false);
        assert_eq!(writer.len(), 2);

        let archive = writer.finish().unwrap();
        let entries = central_directory(&archive);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "same.txt");
        assert_eq!(entries[1].0, "same.txt");
        assert_ne!(entries[0].1, entries[1].1);
    }
}
