//! Append-only error journal.
//!
//! Each entry is one line: `<RFC 3339 UTC timestamp with milliseconds> - <message>`.
//! There is no rotation.

use crate::Result;
use crate::error::BackupError;
use chrono::{SecondsFormat, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the journal inside the log directory.
pub const ERROR_LOG_FILE: &str = "error.log";

/// Destination for error messages that must outlive the console.
///
/// Recording never fails the caller; a journal that cannot be written is
/// reported on the console instead.
pub trait ErrorLog: Send + Sync {
    /// Appends one message.
    fn record(&self, message: &str);
}

/// Default journal directory: `logs` under the installation root, i.e. the
/// parent of the directory holding the executable.
///
/// Falls back to `./logs` when the executable path is unavailable.
pub fn default_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
        .map(|root| root.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Journal directories tried in order when none is configured: the
/// installation root, then a per-user location under the temp directory.
pub fn default_log_dirs() -> Vec<PathBuf> {
    vec![
        default_log_dir(),
        std::env::temp_dir().join("dbbackup").join("logs"),
    ]
}

fn format_entry(message: &str) -> String {
    format!(
        "{} - {}\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

/// Journal backed by `<dir>/error.log`.
#[derive(Debug)]
pub struct FileErrorLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileErrorLog {
    /// Creates the journal, making sure its directory exists and the file
    /// can be opened for appending.
    ///
    /// # Errors
    /// Returns `BackupError::Io` if the directory cannot be created or the
    /// file is not writable
    pub fn new(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref();
        std::fs::create_dir_all(directory).map_err(|e| {
            BackupError::io(
                format!("Failed to create log directory {}", directory.display()),
                e,
            )
        })?;

        let path = directory.join(ERROR_LOG_FILE);
        open_for_append(&path)
            .map_err(|e| BackupError::io(format!("Failed to open {}", path.display()), e))?;

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Opens the journal in the first usable directory.
    ///
    /// Each directory that cannot be used is reported with a warning.
    ///
    /// # Errors
    /// Returns the last directory's error if none of them is usable, or a
    /// configuration error if `directories` is empty
    pub fn open_first(directories: &[PathBuf]) -> Result<Self> {
        let mut last_error = None;
        for directory in directories {
            match Self::new(directory) {
                Ok(log) => return Ok(log),
                Err(e) => {
                    tracing::warn!("Error journal unavailable: {}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| BackupError::configuration("No error journal directory given")))
    }

    /// Location of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        open_for_append(&self.path)?.write_all(entry.as_bytes())
    }
}

fn open_for_append(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

impl ErrorLog for FileErrorLog {
    fn record(&self, message: &str) {
        if let Err(e) = self.append(&format_entry(message)) {
            tracing::warn!(
                "Failed to write error journal {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// In-memory journal for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryErrorLog {
    entries: Mutex<Vec<String>>,
}

impl MemoryErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl ErrorLog for MemoryErrorLog {
    fn record(&self, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(message.to_string());
        }
    }
}
