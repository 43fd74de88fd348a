//! Command implementations for the ferroflate CLI.

use crate::Container;
use crate::utils::{confirm_overwrite, create_progress_bar, format_size};
use ferroflate_deflate::gzip::{self, GzipHeader};
use ferroflate_deflate::{gzip_compress_parallel, zlib_compress, zlib_compress_parallel, zlib_decompress};
use filetime::FileTime;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Compress `input` into the chosen container.
pub fn cmd_compress(
    input: &Path,
    output: Option<PathBuf>,
    level: u8,
    format: Container,
    parallel: bool,
    force: bool,
    keep: bool,
) -> io::Result<()> {
    let data = fs::read(input)?;
    let output = output.unwrap_or_else(|| {
        let suffix = match format {
            Container::Gzip => "gz",
            Container::Zlib => "zz",
        };
        let mut name = input.as_os_str().to_owned();
        name.push(format!(".{suffix}"));
        PathBuf::from(name)
    });
    if !confirm_overwrite(&output, force)? {
        eprintln!("not overwritten: {}", output.display());
        return Ok(());
    }

    let progress = create_progress_bar(data.len() as u64);
    progress.set_message("compressing");

    let compressed = match (format, parallel) {
        (Container::Gzip, false) => {
            let filename = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let header = GzipHeader::with_filename(&filename).with_mtime_now();
            gzip::compress_with_header(&data, level, &header)
        }
        (Container::Gzip, true) => {
            gzip_compress_parallel(&data, level, ferroflate_deflate::parallel::DEFAULT_CHUNK_SIZE)
        }
        (Container::Zlib, false) => zlib_compress(&data, level),
        (Container::Zlib, true) => {
            zlib_compress_parallel(&data, level, ferroflate_deflate::parallel::DEFAULT_CHUNK_SIZE)
        }
    }
    .map_err(io::Error::other)?;

    progress.finish_and_clear();
    fs::write(&output, &compressed)?;

    let ratio = if data.is_empty() {
        0.0
    } else {
        100.0 * (1.0 - compressed.len() as f64 / data.len() as f64)
    };
    eprintln!(
        "{}: {} -> {} ({ratio:.1}% saved)",
        input.display(),
        format_size(data.len() as u64),
        format_size(compressed.len() as u64),
    );

    if !keep {
        fs::remove_file(input)?;
    }
    Ok(())
}

/// Decompress `input`, restoring the gzip filename and mtime when
/// present.
pub fn cmd_decompress(
    input: &Path,
    output: Option<PathBuf>,
    force: bool,
    keep: bool,
) -> io::Result<()> {
    let data = fs::read(input)?;
    let progress = create_progress_bar(data.len() as u64);
    progress.set_message("decompressing");

    let (decompressed, header) = decode_auto(&data).map_err(io::Error::other)?;
    progress.finish_and_clear();

    let output = output.unwrap_or_else(|| default_decompressed_name(input, header.as_ref()));
    if !confirm_overwrite(&output, force)? {
        eprintln!("not overwritten: {}", output.display());
        return Ok(());
    }
    fs::write(&output, &decompressed)?;

    // Restore the archived modification time, like gzip does.
    if let Some(header) = &header {
        if header.mtime != 0 {
            let mtime = FileTime::from_unix_time(i64::from(header.mtime), 0);
            filetime::set_file_mtime(&output, mtime)?;
        }
    }

    eprintln!(
        "{}: {} -> {}",
        input.display(),
        format_size(data.len() as u64),
        format_size(decompressed.len() as u64),
    );

    if !keep {
        fs::remove_file(input)?;
    }
    Ok(())
}

/// Decompress to standard output.
pub fn cmd_cat(input: &Path) -> io::Result<()> {
    let data = fs::read(input)?;
    let (decompressed, _) = decode_auto(&data).map_err(io::Error::other)?;
    io::stdout().write_all(&decompressed)
}

/// Verify the integrity of compressed files.
pub fn cmd_test(files: &[PathBuf]) -> io::Result<()> {
    let mut failures = 0;
    for file in files {
        let data = fs::read(file)?;
        match decode_auto(&data) {
            Ok((out, _)) => {
                println!("{}: OK ({})", file.display(), format_size(out.len() as u64));
            }
            Err(err) => {
                println!("{}: FAILED ({err})", file.display());
                failures += 1;
            }
        }
    }
    if failures > 0 {
        return Err(io::Error::other(format!("{failures} file(s) failed")));
    }
    Ok(())
}

/// Decode gzip or zlib, sniffing the container from the magic bytes.
fn decode_auto(
    data: &[u8],
) -> ferroflate_core::Result<(Vec<u8>, Option<GzipHeader>)> {
    if data.starts_with(&gzip::GZIP_MAGIC) {
        let (header, out) = gzip::decompress_with_header(data)?;
        Ok((out, Some(header)))
    } else {
        Ok((zlib_decompress(data)?, None))
    }
}

/// Output name for a decompressed file: the gzip header's stored
/// filename if any, else the input minus its compression suffix.
fn default_decompressed_name(input: &Path, header: Option<&GzipHeader>) -> PathBuf {
    if let Some(name) = header.and_then(|h| h.filename.as_deref()) {
        // Stored names are advisory; take only the final component.
        let name = Path::new(name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("out"));
        return input.with_file_name(name);
    }

    match input.extension().and_then(|e| e.to_str()) {
        Some("gz") | Some("zz") => input.with_extension(""),
        _ => {
            let mut name = input.as_os_str().to_owned();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}
