//! Line-file primitives
//!
//! All crawler state lives in small site-scoped files: the sitemap snapshot
//! and blacklist are line-delimited relative URLs, the meta file is JSON.
//! Writes go through [`save_atomic`] so a reader never observes a
//! half-written file; the temp file is created in the destination directory
//! so the rename stays on one filesystem.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Writes `content` to `path` atomically (temp file, flush, rename)
pub fn save_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("stoker");
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    {
        let mut file = File::create(&tmp)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a file to a string; a missing file reads as empty
pub fn read_or_empty(path: &Path) -> io::Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

/// Counts non-empty lines; a missing file counts as zero
pub fn count_lines(path: &Path) -> usize {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().filter(|l| !l.trim().is_empty()).count(),
        Err(_) => 0,
    }
}

/// Splits text into trimmed, non-empty, deduplicated lines (first-seen order)
pub fn sanitize_lines(text: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_string()))
        .map(str::to_string)
        .collect()
}
