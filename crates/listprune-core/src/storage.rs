//! Atomic CSV snapshot files
//!
//! Membership records and the work queue share one on-disk form: a header row
//! naming the identifier column followed by one identifier per row. Every
//! write replaces the whole file through a synced temp file and a rename, so
//! a reader sees either the previous snapshot or the new one.

use crate::error::StorageError;
use crate::types::Identifier;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Header of the identifier column
pub const PROFILE_ID_COLUMN: &str = "profile_id";

/// A CSV file holding a complete list of identifiers
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all non-empty identifiers in file order
    pub fn read(&self) -> Result<Vec<Identifier>, StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|source| self.csv_error(source))?;

        let column = reader
            .headers()
            .map_err(|source| self.csv_error(source))?
            .iter()
            .position(|h| h == PROFILE_ID_COLUMN)
            .ok_or_else(|| StorageError::MissingColumn {
                path: self.path.clone(),
                column: PROFILE_ID_COLUMN.to_string(),
            })?;

        let mut identifiers = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| self.csv_error(source))?;
            match record.get(column) {
                Some(value) if !value.is_empty() => identifiers.push(Identifier::from(value)),
                _ => {}
            }
        }
        Ok(identifiers)
    }

    /// Replace the file with exactly `identifiers`, durably.
    ///
    /// Returns only after the new contents are synced and renamed into place.
    pub fn write<'a, I>(&self, identifiers: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = &'a Identifier>,
    {
        if let Some(parent) = self.parent_dir() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let temp_path = self.temp_path();
        let result = self.write_temp(&temp_path, identifiers).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|source| self.io_error(source))
        });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
            return result;
        }

        self.sync_parent_dir();
        Ok(())
    }

    fn write_temp<'a, I>(&self, temp_path: &Path, identifiers: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = &'a Identifier>,
    {
        let temp_error = |source: std::io::Error| StorageError::Io {
            path: temp_path.to_path_buf(),
            source,
        };

        let file = File::create(temp_path).map_err(temp_error)?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record([PROFILE_ID_COLUMN])
            .map_err(|source| self.csv_error(source))?;
        for identifier in identifiers {
            writer
                .write_record([identifier.as_str()])
                .map_err(|source| self.csv_error(source))?;
        }

        let file = writer
            .into_inner()
            .map_err(|err| temp_error(err.into_error()))?;
        file.sync_all().map_err(temp_error)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    // Makes the rename itself durable. Not supported on every platform.
    fn sync_parent_dir(&self) {
        #[cfg(unix)]
        {
            let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
            if let Ok(handle) = File::open(dir) {
                let _ = handle.sync_all();
            }
        }
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StorageError {
        StorageError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ids(values: &[&str]) -> Vec<Identifier> {
        values.iter().copied().map(Identifier::from).collect()
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("queue.csv"));

        file.write(&ids(&["01A", "01B", "01C"])).unwrap();
        assert_eq!(file.read().unwrap(), ids(&["01A", "01B", "01C"]));

        let raw = fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw, "profile_id\n01A\n01B\n01C\n");
    }

    #[test]
    fn test_empty_snapshot_keeps_header() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("queue.csv"));

        file.write(&Vec::<Identifier>::new()).unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "profile_id\n");
        assert!(file.read().unwrap().is_empty());
    }

    #[test]
    fn test_overwrite_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("queue.csv"));

        file.write(&ids(&["01A", "01B"])).unwrap();
        file.write(&ids(&["01B"])).unwrap();

        assert_eq!(file.read().unwrap(), ids(&["01B"]));
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_skips_blank_rows_and_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.csv");
        fs::write(&path, "email,profile_id\na@x.io,01A\nb@x.io,\nc@x.io,01C\n").unwrap();

        let file = SnapshotFile::new(&path);
        assert_eq!(file.read().unwrap(), ids(&["01A", "01C"]));
    }

    #[test]
    fn test_missing_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.csv");
        fs::write(&path, "email\na@x.io\n").unwrap();

        let result = SnapshotFile::new(&path).read();
        assert!(matches!(result, Err(StorageError::MissingColumn { .. })));
    }

    #[test]
    fn test_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested/out/list.csv"));

        file.write(&ids(&["01A"])).unwrap();
        assert!(file.exists());
    }
}
