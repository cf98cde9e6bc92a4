//! Directory lifecycle and copy helpers.
//!
//! Every operation separates two kinds of failure:
//!
//! - **Fatal**: the operation could not start at all (the target directory
//!   can't be created or read, the source tree is missing). Returned as `Err`.
//! - **Per-entry**: one file or subdirectory failed while the rest went
//!   through. Collected into the report's `failures` and the walk continues.
//!
//! Callers decide what a failure means for them; nothing here prints.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("cannot inspect {path}: {source}")]
    Inspect { path: PathBuf, source: io::Error },
    #[error("cannot create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot read directory {path}: {source}")]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("cannot remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("cannot walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("source directory not found: {0}")]
    SourceMissing(PathBuf),
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("destination already exists and is not empty: {0}")]
    DestinationExists(PathBuf),
}

/// Result of [`ensure_empty_directory`].
#[derive(Debug, Default)]
pub struct ClearReport {
    /// The directory did not exist and was created.
    pub created: bool,
    /// Top-level entries that were removed.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<FsError>,
}

/// Result of [`copy_tree`] and [`copy_tree_contents_into`].
#[derive(Debug, Default)]
pub struct CopyReport {
    /// Destination paths of every file written.
    pub files: Vec<PathBuf>,
    pub failures: Vec<FsError>,
}

/// Tri-state existence check.
///
/// `Undeterminable` carries the OS error so a permission problem is never
/// mistaken for absence.
#[derive(Debug)]
pub enum PathStatus {
    Absent,
    Present,
    Undeterminable(io::Error),
}

pub fn exists(path: &Path) -> PathStatus {
    match path.try_exists() {
        Ok(true) => PathStatus::Present,
        Ok(false) => PathStatus::Absent,
        Err(e) => PathStatus::Undeterminable(e),
    }
}

/// Make `path` an empty directory.
///
/// Creates it (with parents) when absent. When present, every entry inside is
/// removed (files individually, subdirectories recursively) while the
/// directory itself stays. Entries that fail to delete are reported and the
/// rest are still attempted.
pub fn ensure_empty_directory(path: &Path) -> Result<ClearReport, FsError> {
    let mut report = ClearReport::default();

    match fs::metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|source| FsError::CreateDir {
                path: path.to_path_buf(),
                source,
            })?;
            report.created = true;
            return Ok(report);
        }
        Err(source) => {
            return Err(FsError::Inspect {
                path: path.to_path_buf(),
                source,
            });
        }
        Ok(meta) if !meta.is_dir() => return Err(FsError::NotADirectory(path.to_path_buf())),
        Ok(_) => {}
    }

    let entries = fs::read_dir(path).map_err(|source| FsError::ReadDir {
        path: path.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                report.failures.push(FsError::ReadDir {
                    path: path.to_path_buf(),
                    source,
                });
                continue;
            }
        };
        let entry_path = entry.path();
        // file_type() does not follow symlinks, so a link to a directory is
        // unlinked rather than having its target emptied.
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let result = if is_dir {
            fs::remove_dir_all(&entry_path)
        } else {
            fs::remove_file(&entry_path)
        };
        match result {
            Ok(()) => report.removed.push(entry_path),
            Err(source) => report.failures.push(FsError::Remove {
                path: entry_path,
                source,
            }),
        }
    }

    Ok(report)
}

/// Recursively copy the contents of `source` into a fresh `destination`.
///
/// `destination` may be absent or an empty directory; anything else is a
/// conflict and nothing is copied.
pub fn copy_tree(source: &Path, destination: &Path) -> Result<CopyReport, FsError> {
    require_dir(source)?;

    match fs::metadata(destination) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(FsError::Inspect {
                path: destination.to_path_buf(),
                source,
            });
        }
        Ok(meta) => {
            if !meta.is_dir() || !dir_is_empty(destination)? {
                return Err(FsError::DestinationExists(destination.to_path_buf()));
            }
        }
    }

    copy_tree_contents_into(source, destination)
}

/// Recursively copy the contents of `source` into `destination`, creating it
/// if needed and overwriting same-named files already there.
pub fn copy_tree_contents_into(source: &Path, destination: &Path) -> Result<CopyReport, FsError> {
    require_dir(source)?;
    fs::create_dir_all(destination).map_err(|e| FsError::CreateDir {
        path: destination.to_path_buf(),
        source: e,
    })?;

    let mut report = CopyReport::default();
    for entry in WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.failures.push(FsError::Walk(e));
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            if let Err(e) = fs::create_dir_all(&target) {
                report.failures.push(FsError::CreateDir {
                    path: target,
                    source: e,
                });
            }
        } else {
            match fs::copy(entry.path(), &target) {
                Ok(_) => report.files.push(target),
                Err(e) => report.failures.push(FsError::Copy {
                    from: entry.path().to_path_buf(),
                    to: target,
                    source: e,
                }),
            }
        }
    }

    Ok(report)
}

fn require_dir(path: &Path) -> Result<(), FsError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FsError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(FsError::SourceMissing(path.to_path_buf()))
        }
        Err(source) => Err(FsError::Inspect {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn dir_is_empty(path: &Path) -> Result<bool, FsError> {
    let mut entries = fs::read_dir(path).map_err(|source| FsError::ReadDir {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(entries.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    // =========================================================================
    // ensure_empty_directory
    // =========================================================================

    #[test]
    fn ensure_empty_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("public/nested");

        let report = ensure_empty_directory(&out).unwrap();

        assert!(report.created);
        assert!(out.is_dir());
        assert!(report.failures.is_empty());
    }

    #[test]
    fn ensure_empty_clears_files_and_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("public");
        write(&out.join("index.html"), "old");
        write(&out.join("old-post/index.html"), "old");
        write(&out.join("assets/css/site.css"), "old");

        let report = ensure_empty_directory(&out).unwrap();

        assert!(!report.created);
        assert_eq!(report.removed.len(), 3);
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn ensure_empty_on_empty_directory_is_noop() {
        let tmp = TempDir::new().unwrap();
        let report = ensure_empty_directory(tmp.path()).unwrap();
        assert!(!report.created);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn ensure_empty_rejects_regular_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("public");
        write(&file, "not a dir");

        let result = ensure_empty_directory(&file);
        assert!(matches!(result, Err(FsError::NotADirectory(_))));
        assert!(file.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn ensure_empty_unlinks_symlinked_directory_without_touching_target() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("keep");
        write(&target.join("precious.txt"), "keep me");
        let out = tmp.path().join("public");
        fs::create_dir(&out).unwrap();
        std::os::unix::fs::symlink(&target, out.join("link")).unwrap();

        let report = ensure_empty_directory(&out).unwrap();

        assert!(report.failures.is_empty());
        assert!(target.join("precious.txt").is_file());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    // =========================================================================
    // copy_tree
    // =========================================================================

    #[test]
    fn copy_tree_duplicates_nested_contents() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("assets");
        write(&src.join("css/style.css"), "body {}");
        write(&src.join("js/main.js"), "void 0;");
        write(&src.join("favicon.ico"), "ico");
        let dst = tmp.path().join("public/assets");

        let report = copy_tree(&src, &dst).unwrap();

        assert_eq!(report.files.len(), 3);
        assert!(report.failures.is_empty());
        assert_eq!(fs::read_to_string(dst.join("css/style.css")).unwrap(), "body {}");
        assert_eq!(fs::read_to_string(dst.join("js/main.js")).unwrap(), "void 0;");
    }

    #[test]
    fn copy_tree_accepts_empty_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src.join("a.txt"), "a");
        let dst = tmp.path().join("dst");
        fs::create_dir(&dst).unwrap();

        let report = copy_tree(&src, &dst).unwrap();
        assert_eq!(report.files, vec![dst.join("a.txt")]);
    }

    #[test]
    fn copy_tree_refuses_populated_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src.join("a.txt"), "new");
        let dst = tmp.path().join("dst");
        write(&dst.join("a.txt"), "old");

        let result = copy_tree(&src, &dst);

        assert!(matches!(result, Err(FsError::DestinationExists(_))));
        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "old");
    }

    #[test]
    fn copy_tree_missing_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = copy_tree(&tmp.path().join("nope"), &tmp.path().join("dst"));
        assert!(matches!(result, Err(FsError::SourceMissing(_))));
        assert!(!tmp.path().join("dst").exists());
    }

    // =========================================================================
    // copy_tree_contents_into
    // =========================================================================

    #[test]
    fn copy_into_merges_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("trip");
        write(&src.join("photo.jpg"), "new photo");
        write(&src.join("maps/route.png"), "route");
        let dst = tmp.path().join("public/trip");
        write(&dst.join("photo.jpg"), "old photo");
        write(&dst.join("index.html"), "page");

        let report = copy_tree_contents_into(&src, &dst).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(fs::read_to_string(dst.join("photo.jpg")).unwrap(), "new photo");
        assert_eq!(fs::read_to_string(dst.join("index.html")).unwrap(), "page");
        assert!(dst.join("maps/route.png").is_file());
    }

    #[test]
    fn copy_into_creates_destination() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir(&src).unwrap();
        let dst = tmp.path().join("a/b/c");

        let report = copy_tree_contents_into(&src, &dst).unwrap();
        assert!(report.files.is_empty());
        assert!(dst.is_dir());
    }

    #[test]
    fn copy_into_rejects_file_source() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("file.txt");
        write(&src, "x");
        let result = copy_tree_contents_into(&src, &tmp.path().join("dst"));
        assert!(matches!(result, Err(FsError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn ensure_empty_reports_entries_it_cannot_remove() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("public");
        write(&out.join("free.html"), "x");
        write(&out.join("locked/page.html"), "x");
        let locked = out.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users ignore directory permissions.
        if fs::write(locked.join("write-check"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = ensure_empty_directory(&out).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(report.removed, vec![out.join("free.html")]);
        assert!(matches!(
            &report.failures[..],
            [FsError::Remove { path, .. }] if *path == locked
        ));
        assert!(!out.join("free.html").exists());
        assert!(locked.join("page.html").exists());
    }

    // =========================================================================
    // exists
    // =========================================================================

    #[test]
    fn exists_reports_absent_and_present() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("post.md");
        assert!(matches!(exists(&file), PathStatus::Absent));
        write(&file, "---\n---\n");
        assert!(matches!(exists(&file), PathStatus::Present));
        assert!(matches!(exists(tmp.path()), PathStatus::Present));
    }

    #[test]
    fn exists_under_regular_file_is_undeterminable() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("post.md");
        write(&file, "not a directory");
        assert!(matches!(
            exists(&file.join("child.md")),
            PathStatus::Undeterminable(_)
        ));
    }
}
