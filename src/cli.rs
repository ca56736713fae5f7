use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "doczip")]
#[command(version)]
#[command(about = "Pack files into a document-container ZIP archive", long_about = None)]
#[command(after_help = "Examples:\n  \
  doczip book.epub mimetype META-INF OEBPS      pack an EPUB, mimetype entry first\n  \
  doczip -0 raw.zip assets/                     store everything uncompressed\n  \
  doczip -j flat.zip docs/readme.md             archive names without directories")]
pub struct Cli {
    /// Output archive path
    #[arg(value_name = "ARCHIVE")]
    pub archive: String,

    /// Files or directories to pack, in archive order
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<String>,

    /// Store all entries uncompressed (no DEFLATE)
    #[arg(short = '0')]
    pub store_only: bool,

    /// Junk paths (archive names keep only the base filename)
    #[arg(short = 'j')]
    pub junk_paths: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}
