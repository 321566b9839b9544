//! Archive management for rotated log files
//!
//! Archives live next to the active file as `<name>.1`, `<name>.2`, ...
//! with `.1` the most recent.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Path of the `index`-th archive of `path`
pub fn archive_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("log"));
    name.push(format!(".{}", index));
    path.with_file_name(name)
}

/// Parse the archive index out of `candidate` if it is an archive of `path`
fn archive_index(path: &Path, candidate: &Path) -> Option<usize> {
    let base = path.file_name()?.to_str()?;
    let name = candidate.file_name()?.to_str()?;
    let suffix = name.strip_prefix(base)?.strip_prefix('.')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok().filter(|&i| i > 0)
}

/// Existing archives of `path` with their indices, ordered newest first
fn indexed_archives(path: &Path) -> io::Result<Vec<(usize, PathBuf)>> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in fs::read_dir(dir)? {
        let candidate = entry?.path();
        if let Some(index) = archive_index(path, &candidate) {
            archives.push((index, candidate));
        }
    }
    archives.sort_by_key(|(index, _)| *index);
    Ok(archives)
}

/// List existing archives of `path`, ordered newest first
pub fn list_archives(path: &Path) -> io::Result<Vec<PathBuf>> {
    Ok(indexed_archives(path)?
        .into_iter()
        .map(|(_, p)| p)
        .collect())
}

/// Remove archives whose index is above `max_files`
///
/// Returns the number of files deleted.
pub fn prune_archives(path: &Path, max_files: usize) -> io::Result<usize> {
    let mut deleted_count = 0;
    for (index, archive) in indexed_archives(path)? {
        if index > max_files && fs::remove_file(&archive).is_ok() {
            deleted_count += 1;
        }
    }
    Ok(deleted_count)
}

/// Move the active file into the archive set
///
/// Existing archives shift up by one, any that would land beyond
/// `max_files` are discarded, and `path` is renamed to `<path>.1`.
/// With `max_files == 0` the active file is simply removed.
pub fn archive_active(path: &Path, max_files: usize) -> io::Result<()> {
    if max_files == 0 {
        return remove_if_exists(path);
    }

    for (index, archive) in indexed_archives(path)?.into_iter().rev() {
        if index >= max_files {
            remove_if_exists(&archive)?;
        } else {
            fs::rename(&archive, archive_path(path, index + 1))?;
        }
    }
    fs::rename(path, archive_path(path, 1))
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
