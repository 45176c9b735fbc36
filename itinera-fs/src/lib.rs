//! Capability-based filesystem helpers shared by the Itinera crates.
//!
//! Paths are UTF-8 (`camino`) and every access goes through a `cap-std`
//! directory handle opened with ambient authority, so callers never touch
//! `std::fs` directly. JSON documents (queries, results and translation
//! caches) are read and written through [`read_json`] and [`write_json`].
#![forbid(unsafe_code)]

use std::io;
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised by the JSON document helpers.
#[derive(Debug, Error)]
pub enum JsonFileError {
    /// The file could not be opened, read or written.
    #[error("failed to access {path}")]
    Io {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file did not hold the expected document.
    #[error("failed to decode JSON from {path}")]
    Decode {
        /// Offending path.
        path: Utf8PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The value could not be encoded.
    #[error("failed to encode JSON for {path}")]
    Encode {
        /// Destination path.
        path: Utf8PathBuf,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },
}

impl JsonFileError {
    fn io(path: &Utf8Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Open the directory holding `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or its directory cannot be opened.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Create the directory that will hold `path`, with any missing ancestors.
///
/// # Errors
/// Propagates failures to open the base directory or create the chain.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Create `dir` and any missing ancestors.
///
/// # Errors
/// Propagates failures to open the base directory or create the chain.
pub fn ensure_dir(dir: &Utf8Path) -> io::Result<()> {
    let (base, relative) = split_base(dir)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Whether `path` names an existing regular file. A missing parent
/// directory counts as absent.
///
/// # Errors
/// Fails on I/O errors other than the file or its directory being missing.
pub fn file_exists(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(error) => return Err(error),
    };
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error),
    }
}

/// Whether `path` exists and is a regular file. Unlike [`file_exists`], a
/// missing file is an error with kind [`io::ErrorKind::NotFound`].
///
/// # Errors
/// Propagates I/O failures, including the path being absent.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Whether `path` exists and is a directory.
///
/// # Errors
/// Propagates I/O failures, including the path being absent.
pub fn path_is_dir(path: &Utf8Path) -> io::Result<bool> {
    let (base, relative) = split_base(path)?;
    if relative.as_str().is_empty() {
        return Ok(true);
    }
    base.metadata(&relative).map(|meta| meta.is_dir())
}

/// Read a whole UTF-8 file.
///
/// # Errors
/// Propagates I/O failures.
pub fn read_to_string(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.read_to_string(name.as_str())
}

/// Write `contents` to `path`, creating parent directories first.
///
/// # Errors
/// Propagates I/O failures.
pub fn write_string(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    dir.write(name.as_str(), contents)
}

/// Decode the JSON document at `path`.
///
/// # Errors
/// Returns [`JsonFileError::Io`] when the file cannot be read and
/// [`JsonFileError::Decode`] when it does not hold a `T`.
pub fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, JsonFileError> {
    let text = read_to_string(path).map_err(|source| JsonFileError::io(path, source))?;
    serde_json::from_str(&text).map_err(|source| JsonFileError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode `value` as pretty-printed JSON at `path`, creating parent
/// directories first.
///
/// # Errors
/// Returns [`JsonFileError::Encode`] when `value` cannot be encoded and
/// [`JsonFileError::Io`] when the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: &Utf8Path, value: &T) -> Result<(), JsonFileError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| JsonFileError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');
    write_string(path, &text).map_err(|source| JsonFileError::io(path, source))
}

/// Split `dir` into an ambient base directory (the root, a Windows prefix
/// or the working directory) and the path below it.
fn split_base(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let base = match dir.as_std_path().components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR_STR)
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR),
        _ => Utf8PathBuf::from("."),
    };
    let relative = if base.as_str() == "." {
        dir.to_path_buf()
    } else {
        dir.strip_prefix(&base)
            .map_err(|_| io::Error::other(format!("{dir} is not below {base}")))?
            .to_path_buf()
    };
    let handle = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((handle, relative))
}
