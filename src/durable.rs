//! Crash-safe file creation and replacement
//!
//! [`write_file`] stages bytes in `<dir>/.tmp.<name>~`, fsyncs them, renames
//! the staging file onto the final path and then fsyncs the directory. The
//! rename is the only commit point: a reader sees either the previous file or
//! the complete new one, never a partial write.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Invalid target path: {0}")]
    InvalidPath(PathBuf),

    #[error("Failed to create parent directory {path} (mode {mode:03o}): {source}")]
    CreateDir {
        path: PathBuf,
        mode: u32,
        source: io::Error,
    },

    #[error("Failed to open parent directory {path} for metadata sync: {source}")]
    OpenDir { path: PathBuf, source: io::Error },

    #[error("Failed to create temporary file {path} (mode {mode:03o}): {source}")]
    CreateTemp {
        path: PathBuf,
        mode: u32,
        source: io::Error,
    },

    #[error("I/O error while writing to temporary file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("I/O error while syncing file data to disk for {path}: {source}")]
    SyncFile { path: PathBuf, source: io::Error },

    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("I/O error while syncing directory metadata to disk for {path}: {source}")]
    SyncDir { path: PathBuf, source: io::Error },
}

/// Directory mode derived from a file mode: keep the read and write bits and
/// set each execute bit to its read bit.
pub fn dir_mode_for(mode: u32) -> u32 {
    (0o666 & mode) | ((0o444 & mode) >> 2)
}

/// Staging file path for `path`: `<dir>/.tmp.<name>~`
pub fn temp_path_for(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let mut temp_name = std::ffi::OsString::from(".tmp.");
    temp_name.push(name);
    temp_name.push("~");
    Some(parent_dir(path).join(temp_name))
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Removes the staging file on drop unless disarmed after a successful rename.
struct StagedFile<'a> {
    path: &'a Path,
    armed: bool,
}

impl Drop for StagedFile<'_> {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(self.path);
        }
    }
}

/// Atomically write `contents` to `path` with permission bits `mode`.
///
/// Missing parent directories are created with [`dir_mode_for`]`(mode)`.
/// Any failure aborts the write; the final path is then either untouched or,
/// if the rename already happened, complete.
pub fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<(), WriteError> {
    let temp_path = temp_path_for(path).ok_or_else(|| WriteError::InvalidPath(path.into()))?;
    let dir_path = parent_dir(path);

    let dir_mode = dir_mode_for(mode);
    create_dir_all(dir_path, dir_mode).map_err(|source| WriteError::CreateDir {
        path: dir_path.into(),
        mode: dir_mode,
        source,
    })?;

    let dir = File::open(dir_path).map_err(|source| WriteError::OpenDir {
        path: dir_path.into(),
        source,
    })?;

    // A leftover from an interrupted run would make the exclusive create fail.
    let _ = fs::remove_file(&temp_path);

    let mut file = create_new(&temp_path, mode).map_err(|source| WriteError::CreateTemp {
        path: temp_path.clone(),
        mode,
        source,
    })?;
    let mut staged = StagedFile {
        path: &temp_path,
        armed: true,
    };

    file.write_all(contents)
        .map_err(|source| WriteError::Write {
            path: temp_path.clone(),
            source,
        })?;
    file.sync_all().map_err(|source| WriteError::SyncFile {
        path: temp_path.clone(),
        source,
    })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|source| WriteError::Rename {
        from: temp_path.clone(),
        to: path.into(),
        source,
    })?;
    staged.armed = false;

    dir.sync_all().map_err(|source| WriteError::SyncDir {
        path: dir_path.into(),
        source,
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "Durable write completed");
    Ok(())
}

#[cfg(unix)]
fn create_dir_all(path: &Path, mode: u32) -> io::Result<()> {
    DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path, _mode: u32) -> io::Result<()> {
    DirBuilder::new().recursive(true).create(path)
}

#[cfg(unix)]
fn create_new(path: &Path, mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn create_new(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}
