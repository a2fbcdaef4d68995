//! File-backed submission history
//!
//! The whole log lives in one JSON array, pretty-printed with two-space
//! indentation and non-ASCII text kept literal. Mutations hold an exclusive
//! advisory lock on a sidecar `<file>.lock` and replace the history through a
//! temporary file renamed into place, so readers never observe a partial
//! write.

use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::domain::{HistoryError, HistoryLog, HistoryPort, Submission};

#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Runs `f` while holding the exclusive history lock.
    fn with_lock<F, R>(&self, f: F) -> Result<R, HistoryError>
    where
        F: FnOnce() -> Result<R, HistoryError>,
    {
        std::fs::create_dir_all(self.directory())?;
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        lock.lock_exclusive()?;
        let result = f();
        FileExt::unlock(&lock)?;
        result
    }

    /// Reads the log. A missing file, or content that is not a JSON array of
    /// objects (including bytes that are not UTF-8), yields an empty log.
    fn read_log(&self) -> Result<HistoryLog, HistoryError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&content) {
            Ok(log) => Ok(log),
            Err(e) => {
                warn!(
                    "History file {} is not a valid log, treating it as empty: {}",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    fn write_log(&self, log: &HistoryLog) -> Result<(), HistoryError> {
        let mut tmp = NamedTempFile::new_in(self.directory())?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, log)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| HistoryError::Io(e.error))?;

        if let Ok(dir) = File::open(self.directory()) {
            // Not every platform can fsync a directory handle.
            let _ = dir.sync_all();
        }
        Ok(())
    }

    pub fn append_blocking(&self, submission: Submission) -> Result<(), HistoryError> {
        self.with_lock(|| {
            let mut log = self.read_log()?;
            log.push(submission);
            self.write_log(&log)?;
            info!(
                "Appended submission to {} ({} entries)",
                self.path.display(),
                log.len()
            );
            Ok(())
        })
    }

    pub fn delete_blocking(&self, index: usize) -> Result<Option<Submission>, HistoryError> {
        self.with_lock(|| {
            let mut log = self.read_log()?;
            if index >= log.len() {
                return Ok(None);
            }
            let removed = log.remove(index);
            self.write_log(&log)?;
            info!(
                "Deleted history entry {} from {}",
                index,
                self.path.display()
            );
            Ok(Some(removed))
        })
    }

    /// Lock-free: writers only ever rename complete files into place.
    pub fn list_blocking(&self) -> Result<HistoryLog, HistoryError> {
        self.read_log()
    }

    async fn run_blocking<F, R>(&self, f: F) -> Result<R, HistoryError>
    where
        F: FnOnce(FileHistoryStore) -> Result<R, HistoryError> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(store))
            .await
            .map_err(|e| HistoryError::Task(e.to_string()))?
    }
}

#[async_trait]
impl HistoryPort for FileHistoryStore {
    async fn append(&self, submission: Submission) -> Result<(), HistoryError> {
        self.run_blocking(move |store| store.append_blocking(submission))
            .await
    }

    async fn delete(&self, index: usize) -> Result<Option<Submission>, HistoryError> {
        self.run_blocking(move |store| store.delete_blocking(index))
            .await
    }

    async fn list(&self) -> Result<HistoryLog, HistoryError> {
        self.run_blocking(|store| store.list_blocking()).await
    }
}
