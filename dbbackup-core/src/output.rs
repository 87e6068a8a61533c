//! Output file handling for exported units.
//!
//! One file per table or collection, named after the unit verbatim. Names
//! that would escape the destination directory or cannot be a single path
//! component are rejected rather than rewritten.

use crate::Result;
use crate::error::BackupError;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Checks that a unit name can be used as a file stem as-is.
///
/// # Errors
/// Returns `BackupError::InvalidUnitName` for empty names, `.`/`..`, and
/// names containing `/`, `\` or NUL
pub fn validate_unit_name(name: &str) -> Result<()> {
    let unusable = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if unusable {
        return Err(BackupError::InvalidUnitName {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Writes unit files into one destination directory.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    destination: PathBuf,
}

impl OutputWriter {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Path of a file inside the destination.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.destination.join(name)
    }

    /// Creates the destination directory and its parents. Idempotent.
    pub async fn ensure_directory(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.destination)
            .await
            .map_err(|e| {
                BackupError::io(
                    format!(
                        "Failed to create destination directory {}",
                        self.destination.display()
                    ),
                    e,
                )
            })
    }

    /// Replaces the file's contents.
    pub async fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path_for(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| BackupError::io(format!("Failed to write {}", path.display()), e))?;
        Ok(path)
    }

    /// Appends to the file, creating it if missing.
    pub async fn append_file(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.path_for(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| BackupError::io(format!("Failed to open {}", path.display()), e))?;

        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| BackupError::io(format!("Failed to append to {}", path.display()), e))?;

        // tokio completes file writes on a blocking task; flush waits for it
        file.flush()
            .await
            .map_err(|e| BackupError::io(format!("Failed to flush {}", path.display()), e))
    }

    /// Truncates the file and returns a buffered handle for streaming
    /// writes.
    pub async fn create(&self, name: &str) -> Result<UnitFile> {
        let path = self.path_for(name);
        let file = File::create(&path)
            .await
            .map_err(|e| BackupError::io(format!("Failed to create {}", path.display()), e))?;

        Ok(UnitFile {
            path,
            writer: BufWriter::new(file),
        })
    }
}

/// Buffered handle on one unit file.
///
/// Contents are only guaranteed on disk after [`UnitFile::finish`].
#[derive(Debug)]
pub struct UnitFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl UnitFile {
    pub async fn append(&mut self, contents: &str) -> Result<()> {
        self.writer.write_all(contents.as_bytes()).await.map_err(|e| {
            BackupError::io(format!("Failed to write {}", self.path.display()), e)
        })
    }

    /// Flushes buffered data and closes the file.
    pub async fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush().await.map_err(|e| {
            BackupError::io(format!("Failed to flush {}", self.path.display()), e)
        })?;
        self.writer.shutdown().await.map_err(|e| {
            BackupError::io(format!("Failed to close {}", self.path.display()), e)
        })?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_unit_name() {
        for name in ["users", "order items", "données", ".hidden", "a.b"] {
            assert!(validate_unit_name(name).is_ok(), "{}", name);
        }

        for name in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            assert!(
                matches!(
                    validate_unit_name(name),
                    Err(BackupError::InvalidUnitName { .. })
                ),
                "{:?}",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_ensure_directory_creates_parents() {
        let temp = TempDir::new().unwrap();
        let destination = temp.path().join("a").join("b");
        let writer = OutputWriter::new(&destination);

        writer.ensure_directory().await.unwrap();
        writer.ensure_directory().await.unwrap();

        assert!(destination.is_dir());
    }

    #[tokio::test]
    async fn test_write_then_append() {
        let temp = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp.path());

        writer.write_file("t.sql", "old").await.unwrap();
        writer.write_file("t.sql", "CREATE;\n\n").await.unwrap();
        writer.append_file("t.sql", "INSERT 1;\n").await.unwrap();

        let contents = std::fs::read_to_string(temp.path().join("t.sql")).unwrap();
        assert_eq!(contents, "CREATE;\n\nINSERT 1;\n");
    }

    #[tokio::test]
    async fn test_append_is_visible_on_return() {
        let temp = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp.path());

        for i in 0..50 {
            writer
                .append_file("rows.sql", &format!("INSERT {};\n", i))
                .await
                .unwrap();
            let contents = std::fs::read_to_string(temp.path().join("rows.sql")).unwrap();
            assert_eq!(contents.lines().count(), i + 1);
        }
    }

    #[tokio::test]
    async fn test_unit_file_truncates_and_streams() {
        let temp = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp.path());
        std::fs::write(temp.path().join("users.sql"), "stale contents").unwrap();

        let mut file = writer.create("users.sql").await.unwrap();
        file.append("line 1\n").await.unwrap();
        file.append("line 2\n").await.unwrap();
        let path = file.finish().await.unwrap();

        assert_eq!(path, temp.path().join("users.sql"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "line 1\nline 2\n");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_is_io_error() {
        let temp = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp.path().join("missing"));

        let result = writer.write_file("t.json", "[]").await;
        assert!(matches!(result, Err(BackupError::Io { .. })));
    }
}
