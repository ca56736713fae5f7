//! Main entry point for the doczip CLI application.
//!
//! This binary provides a command-line interface for packing local files
//! into a document-container ZIP archive. Entries are added in the order
//! they appear on the command line, which is how formats like EPUB expect
//! their `mimetype` entry to land first.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::fs;

use doczip::{Cli, ZipWriter};

/// Application entry point.
///
/// Parses command-line arguments, collects the input files, assembles the
/// archive in memory, and writes it out.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Expand the positional arguments into concrete files, preserving
    // argument order; directories are walked recursively.
    let mut inputs = Vec::new();
    for file in &cli.files {
        collect_files(Path::new(file), cli.junk_paths, &mut inputs)?;
    }

    let mut writer = ZipWriter::new();
    let mut total_input = 0u64;

    for (path, name) in inputs {
        let data = fs::read(&path).await?;
        total_input += data.len() as u64;

        if !cli.is_quiet() {
            println!("  adding: {}", name);
        }

        // With -0 every entry is stored; otherwise DEFLATE is requested
        // and the writer falls back to stored when it does not help
        writer.add(name, data, !cli.store_only);
    }

    let entry_count = writer.len();
    let archive = writer.finish()?;
    fs::write(&cli.archive, &archive).await?;

    if !cli.is_very_quiet() {
        eprintln!(
            "{}: {} entries, {} -> {}",
            cli.archive,
            entry_count,
            format_size(total_input),
            format_size(archive.len() as u64)
        );
    }

    Ok(())
}

/// Recursively collect files to pack, in deterministic order.
///
/// A plain file becomes a single entry. A directory is walked depth-first
/// with children sorted by name, so the same tree always produces the same
/// archive. Directories themselves produce no entries; the archive only
/// models files.
///
/// # Arguments
///
/// * `root` - File or directory path from the command line
/// * `junk_paths` - If true, archive names keep only the base filename
/// * `out` - Accumulator of (disk path, archive name) pairs
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if a path cannot be read.
fn collect_files(root: &Path, junk_paths: bool, out: &mut Vec<(PathBuf, String)>) -> Result<()> {
    let metadata = std::fs::metadata(root)?;

    if metadata.is_dir() {
        let mut children = std::fs::read_dir(root)?.collect::<std::io::Result<Vec<_>>>()?;
        children.sort_by_key(|entry| entry.file_name());

        for child in children {
            collect_files(&child.path(), junk_paths, out)?;
        }
    } else {
        let name = archive_name(root, junk_paths);
        out.push((root.to_path_buf(), name));
    }

    Ok(())
}

/// Derive an entry's archive name from its disk path.
///
/// Archive names are forward-slash separated regardless of host platform,
/// with any leading `./` stripped. With `junk_paths`, only the base
/// filename is kept.
fn archive_name(path: &Path, junk_paths: bool) -> String {
    if junk_paths {
        return path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
    }

    let name = path.to_string_lossy().replace('\\', "/");
    name.trim_start_matches("./").to_string()
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(format_size(500), "500 bytes");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
