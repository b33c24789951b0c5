//! Purpose: Read and write typed JSON documents on the local file system.
//! Exports: `ReadOutcome`, `read_from_file`, `read_from_reader`, `read_from_file_or_default`, `write_to_file`.
//! Role: File IO boundary; delegates all text decode/encode to `codec`.
//! Invariants: Reads hold a shared lock so external writers may keep appending.
//! Invariants: Writes hold an exclusive lock only for the duration of the call.
//! Invariants: A missing file is `Missing`, not an error; every other access failure propagates.
//! Notes: Writes truncate in place; there is no temp-file-and-rename atomicity.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::error::{Error, ErrorKind, Result};

/// Three-valued result of a file read: the file may be missing, present with a
/// literal `null` document, or present with a value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadOutcome<T> {
    Missing,
    Null,
    Value(T),
}

impl<T> ReadOutcome<T> {
    /// Collapses to the two-valued view where both `Missing` and `Null` are `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            ReadOutcome::Value(value) => Some(value),
            ReadOutcome::Missing | ReadOutcome::Null => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ReadOutcome::Missing)
    }
}

impl<T: Default> ReadOutcome<T> {
    /// Substitutes `T::default()` for both `Missing` and `Null`.
    pub fn or_default(self) -> T {
        self.into_option().unwrap_or_default()
    }
}

struct ReadLock<'a> {
    file: &'a File,
}

impl<'a> ReadLock<'a> {
    fn acquire(file: &'a File, path: &Path) -> Result<Self> {
        file.lock_shared().map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to acquire shared file lock")
                .with_path(path)
                .with_source(err)
        })?;
        Ok(Self { file })
    }
}

impl Drop for ReadLock<'_> {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

struct WriteLock<'a> {
    file: &'a File,
}

impl<'a> WriteLock<'a> {
    fn acquire(file: &'a File, path: &Path) -> Result<Self> {
        file.lock_exclusive().map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to acquire exclusive file lock")
                .with_path(path)
                .with_source(err)
        })?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock<'_> {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Reads the file at `path` and decodes it into `T`.
///
/// The file is opened read-only under a shared advisory lock, so another
/// process appending to the same file (a live log) is never blocked or failed.
pub fn read_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<ReadOutcome<T>> {
    let path = path.as_ref();
    let file = match OpenOptions::new().read(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ReadOutcome::Missing),
        Err(err) => {
            return Err(Error::new(ErrorKind::Io)
                .with_message("failed to open file")
                .with_path(path)
                .with_source(err));
        }
    };

    let text = {
        let _lock = ReadLock::acquire(&file, path)?;
        read_text(&file, path)?
    };

    match codec::parse(&text).map_err(|err| err.with_path(path))? {
        Some(value) => Ok(ReadOutcome::Value(value)),
        None => Ok(ReadOutcome::Null),
    }
}

/// Decodes `T` from an already-open reader. No existence handling; the caller
/// owns the handle and its sharing semantics.
pub fn read_from_reader<T: DeserializeOwned>(mut reader: impl Read) -> Result<Option<T>> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read from handle")
            .with_source(err)
    })?;
    codec::parse(&text)
}

/// Reads the file at `path`, substituting `T::default()` when the file is
/// missing or holds a literal `null`. Parse failures still propagate.
pub fn read_from_file_or_default<T: DeserializeOwned + Default>(
    path: impl AsRef<Path>,
) -> Result<T> {
    Ok(read_from_file(path)?.or_default())
}

/// Serializes `value` (indented) and overwrites the file at `path` in full,
/// creating it if absent. Holds an exclusive advisory lock while writing.
pub fn write_to_file<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let text = codec::stringify(value, true)?;

    // Opened without truncate; the file is emptied only once the lock is held.
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(path)
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to open file for writing")
                .with_path(path)
                .with_source(err)
        })?;

    let _lock = WriteLock::acquire(&file, path)?;
    write_text(&file, path, &text)
}

fn read_text(mut file: &File, path: &Path) -> Result<String> {
    let mut text = String::new();
    file.read_to_string(&mut text).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read file")
            .with_path(path)
            .with_source(err)
    })?;
    Ok(text)
}

fn write_text(mut file: &File, path: &Path, text: &str) -> Result<()> {
    let io_error = |err: io::Error| {
        Error::new(ErrorKind::Io)
            .with_message("failed to write file")
            .with_path(path.to_path_buf())
            .with_source(err)
    };
    file.set_len(0).map_err(io_error)?;
    file.write_all(text.as_bytes()).map_err(io_error)?;
    file.flush().map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::{ReadOutcome, read_from_file, read_from_file_or_default, read_from_reader};
    use crate::error::ErrorKind;

    #[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
    struct Settings {
        locale: String,
        volume: u8,
    }

    #[test]
    fn missing_file_is_missing_not_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.json");
        let outcome: ReadOutcome<Settings> = read_from_file(&path).expect("read");
        assert!(outcome.is_missing());
        assert_eq!(outcome.into_option(), None);
    }

    #[test]
    fn missing_file_or_default_yields_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.json");
        let settings: Settings = read_from_file_or_default(&path).expect("read");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn null_content_is_null_not_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("null.json");
        std::fs::write(&path, "null").expect("write");
        let outcome: ReadOutcome<Settings> = read_from_file(&path).expect("read");
        assert_eq!(outcome, ReadOutcome::Null);
        assert!(!outcome.is_missing());
    }

    #[test]
    fn malformed_content_propagates_parse_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{").expect("write");
        let err = read_from_file::<Settings>(&path).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = read_from_file_or_default::<Settings>(&path).expect_err("err");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn reader_variant_decodes_and_maps_null() {
        let value: Option<Settings> =
            read_from_reader(&b"{\"locale\":\"zh-cn\",\"volume\":7}"[..]).expect("read");
        assert_eq!(
            value,
            Some(Settings {
                locale: "zh-cn".to_string(),
                volume: 7,
            })
        );

        let value: Option<Settings> = read_from_reader(&b"null"[..]).expect("read");
        assert_eq!(value, None);
    }
}
