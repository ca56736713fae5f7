//! # doczip
//!
//! A Rust ZIP writer for document containers (EPUB, ODF, OOXML).
//!
//! This library builds the restricted ZIP subset mandated by ISO/IEC 21320-1:
//! compression limited to STORED and DEFLATE, no encryption, no signatures,
//! no multi-volume archives, no ZIP64. That subset is exactly what document
//! formats like EPUB, OpenDocument and Office Open XML require of their
//! on-disk container, and the output is readable by any standard ZIP tool.
//!
//! ## Features
//!
//! - In-memory archive assembly with insertion-order output
//! - Per-entry DEFLATE with automatic fallback to STORED when compression
//!   does not shrink the data
//! - Table-driven CRC-32 integrity checksums as the format requires
//! - Optional caller-supplied MS-DOS modification timestamps
//!
//! ## Example
//!
//! ```
//! use doczip::ZipWriter;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut writer = ZipWriter::new();
//!
//!     // EPUB requires the mimetype entry first, uncompressed
//!     writer.add_text("mimetype", "application/epub+zip", false);
//!     writer.add_text("META-INF/container.xml", "<?xml version=\"1.0\"?>", true);
//!
//!     let archive = writer.finish()?;
//!     assert_eq!(&archive[0..4], b"PK\x03\x04");
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod zip;

pub use cli::Cli;
pub use zip::{CompressionMethod, ZipWriter, crc32, dos_date, dos_time};
