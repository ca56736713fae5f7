//! ZIP archive construction.
//!
//! This module builds the restricted ZIP subset mandated by ISO/IEC 21320-1,
//! the container format used by EPUB, ODF and OOXML documents.
//!
//! ## Architecture
//!
//! The module is organized into three components:
//!
//! - [`structures`]: Data structures for ZIP format records (local file
//!   header, central directory header, EOCD) and DOS timestamp helpers
//! - [`crc32`]: The CRC-32 checksum engine the format requires
//! - [`writer`]: The archive assembler end users drive
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation writes the stream front to back: entry data with
//! local headers first, then the central directory whose records point
//! back at each local header's offset.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - STORED (no compression) method
//! - DEFLATE compression method, with automatic fallback to STORED when
//!   compression does not shrink the data
//!
//! ## Limitations
//!
//! - Write-only; no archive reading or in-place mutation
//! - No ZIP64 extensions (archives and entries must stay under 4 GiB)
//! - No encryption, signatures, or multi-disk archives
//! - No directory entries; every entry is a file

mod crc32;
mod structures;
mod writer;

pub use crc32::crc32;
pub use structures::{CompressionMethod, DOS_EPOCH_DATE, DOS_EPOCH_TIME, dos_date, dos_time};
pub use writer::ZipWriter;
