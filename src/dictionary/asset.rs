// File: src/dictionary/asset.rs
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a dictionary payload lives: a file, plus the offset and length of the
/// payload inside it when the file is a bundle of several.
///
/// The constructors return `None` instead of failing when the file is not a
/// regular file, so callers can read that as "no dictionary available".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetAddress {
    filename: PathBuf,
    offset: u64,
    length: u64,
}

impl AssetAddress {
    /// The whole of an existing regular file.
    pub fn from_file(file: impl AsRef<Path>) -> Option<Self> {
        let file = file.as_ref();
        let metadata = fs::metadata(file).ok().filter(|m| m.is_file())?;
        let filename = std::path::absolute(file).unwrap_or_else(|_| file.to_path_buf());
        Some(Self { filename, offset: 0, length: metadata.len() })
    }

    pub fn from_file_name(filename: Option<&str>) -> Option<Self> {
        Self::from_file(filename?)
    }

    /// A slice of an existing regular file. The name is kept as given.
    pub fn from_file_name_and_offset(filename: Option<&str>, offset: u64, length: u64) -> Option<Self> {
        let filename = filename?;
        if !Path::new(filename).is_file() {
            return None;
        }
        Some(Self { filename: PathBuf::from(filename), offset, length })
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// True when the payload starts at the head of its file, meaning the file
    /// holds nothing else and may be deleted outright.
    pub fn points_to_physical_file(&self) -> bool {
        self.offset == 0
    }

    /// Removes the file (or directory tree) behind this address. Failures are
    /// logged and otherwise ignored; the file may still be there afterwards.
    pub fn delete_underlying_file(&self) {
        let result = if self.filename.is_dir() {
            fs::remove_dir_all(&self.filename)
        } else {
            fs::remove_file(&self.filename)
        };
        if let Err(e) = result {
            debug!(file = %self.filename.display(), error = %e, "could not delete dictionary file");
        }
    }
}

impl fmt::Display for AssetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (offset={}, length={})", self.filename.display(), self.offset, self.length)
    }
}
