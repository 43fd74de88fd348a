//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Show a progress bar for operations on files above this size.
pub const PROGRESS_THRESHOLD: u64 = 4 * 1024 * 1024;

/// Create a progress bar with standard styling, hidden for small jobs.
pub fn create_progress_bar(len: u64) -> ProgressBar {
    if len < PROGRESS_THRESHOLD {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Confirm an overwrite interactively unless `force` is set.
pub fn confirm_overwrite(path: &Path, force: bool) -> std::io::Result<bool> {
    if force || !path.exists() {
        return Ok(true);
    }
    let answer = dialoguer::Confirm::new()
        .with_prompt(format!("{} already exists; overwrite?", path.display()))
        .default(false)
        .interact()
        .map_err(std::io::Error::other)?;
    Ok(answer)
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
