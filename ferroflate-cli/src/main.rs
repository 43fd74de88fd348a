//! ferroflate CLI - gzip-style compression tool.
//!
//! A Pure Rust gzip/zlib compressor and decompressor built on the
//! ferroflate codec.

mod commands;
mod utils;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ferroflate")]
#[command(author, version, about = "Pure Rust gzip/zlib compression tool")]
#[command(long_about = "
ferroflate compresses and decompresses files in the gzip (RFC 1952)
and zlib (RFC 1950) formats using a pure Rust DEFLATE codec.

Examples:
  ferroflate compress file.txt
  ferroflate compress -l 9 --parallel big.log
  ferroflate decompress file.txt.gz
  ferroflate cat file.txt.gz
  ferroflate test file.txt.gz
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Container format for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Container {
    /// gzip (RFC 1952): CRC-32 trailer, filename and mtime metadata.
    Gzip,
    /// zlib (RFC 1950): Adler-32 trailer, no metadata.
    Zlib,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: input with .gz/.zz suffix)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level (0-9)
        #[arg(short, long, default_value = "6")]
        level: u8,

        /// Container format
        #[arg(short, long, value_enum, default_value = "gzip")]
        format: Container,

        /// Compress chunks in parallel (large files)
        #[arg(short, long)]
        parallel: bool,

        /// Overwrite existing output without asking
        #[arg(long)]
        force: bool,

        /// Keep the input file (default removes it, like gzip)
        #[arg(short, long)]
        keep: bool,
    },

    /// Decompress a file
    #[command(alias = "d", alias = "x")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: derived from suffix or gzip header)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite existing output without asking
        #[arg(long)]
        force: bool,

        /// Keep the input file
        #[arg(short, long)]
        keep: bool,
    },

    /// Decompress a file to standard output
    Cat {
        /// File to decompress
        input: PathBuf,
    },

    /// Test compressed file integrity
    #[command(alias = "t")]
    Test {
        /// Files to test
        files: Vec<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            level,
            format,
            parallel,
            force,
            keep,
        } => commands::cmd_compress(&input, output, level, format, parallel, force, keep),
        Commands::Decompress {
            input,
            output,
            force,
            keep,
        } => commands::cmd_decompress(&input, output, force, keep),
        Commands::Cat { input } => commands::cmd_cat(&input),
        Commands::Test { files } => commands::cmd_test(&files),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("ferroflate: {err}");
        std::process::exit(1);
    }
}
