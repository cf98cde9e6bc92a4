//! New post scaffolding for `sen new <path>`.
//!
//! Writes a front-matter-only file with a title derived from the file name,
//! the current local time and `draft: true`:
//!
//! ```text
//! ---
//! title: "My First Post"
//! date: 2023-12-03T09:30:00+05:30
//! draft: true
//! ---
//! ```
//!
//! An existing file is never overwritten.

use crate::fsutil::{self, PathStatus};
use chrono::{DateTime, FixedOffset, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("cannot determine the status of {path}: {source}")]
    Undetermined { path: PathBuf, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot derive a title from {0}")]
    InvalidFileName(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScaffoldOutcome {
    Created(PathBuf),
    /// Left untouched.
    AlreadyExists(PathBuf),
}

/// Scaffold a post at `path` stamped with the current local time.
pub fn create_post(path: &Path) -> Result<ScaffoldOutcome, ScaffoldError> {
    create_post_at(path, &Local::now().fixed_offset())
}

/// Scaffold a post at `path` stamped with `now`.
pub fn create_post_at(
    path: &Path,
    now: &DateTime<FixedOffset>,
) -> Result<ScaffoldOutcome, ScaffoldError> {
    match fsutil::exists(path) {
        PathStatus::Present => return Ok(ScaffoldOutcome::AlreadyExists(path.to_path_buf())),
        PathStatus::Undeterminable(source) => {
            return Err(ScaffoldError::Undetermined {
                path: path.to_path_buf(),
                source,
            });
        }
        PathStatus::Absent => {}
    }

    let title = title_from_path(path).ok_or_else(|| ScaffoldError::InvalidFileName(path.to_path_buf()))?;
    let content = front_matter(&title, &format_timestamp(now));

    // Fails with AlreadyExists if the file appeared after the check.
    let file = OpenOptions::new().write(true).create_new(true).open(path);
    let mut file = match file {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(ScaffoldOutcome::AlreadyExists(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ScaffoldError::Write {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    file.write_all(content.as_bytes())
        .map_err(|source| ScaffoldError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(ScaffoldOutcome::Created(path.to_path_buf()))
}

/// Human-readable title from a file name.
///
/// - `my-first-post.md` → `My First Post`
/// - `notes_on_rust.md` → `Notes On Rust`
pub fn title_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let title = stem
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");
    (!title.is_empty()).then_some(title)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `YYYY-MM-DDTHH:MM:SS±HH:MM`.
pub fn format_timestamp(now: &DateTime<FixedOffset>) -> String {
    format!(
        "{}{}",
        now.format("%Y-%m-%dT%H:%M:%S"),
        format_utc_offset(now.offset().local_minus_utc())
    )
}

/// Format an offset in seconds east of UTC as `+HH:MM` / `-HH:MM`.
///
/// The sign applies to the whole offset, so minutes are never negative:
/// UTC−05:30 is `-05:30`.
pub fn format_utc_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    format!("{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

fn front_matter(title: &str, date: &str) -> String {
    let title = title.replace('\\', "\\\\").replace('"', "\\\"");
    format!("---\ntitle: \"{title}\"\ndate: {date}\ndraft: true\n---\n")
}
