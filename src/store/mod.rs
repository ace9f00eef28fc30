// Store module - flat CSV files for submitted requests
//
// Each record kind lives in its own CSV file (header row + data rows) and is
// the system of record for that kind. Every write is a full
// read-modify-write-whole-file cycle:
//
//   load_all -> mutate in memory -> write temp file -> rename over original
//
// Within this process the cycle is serialized by a per-store mutex, so
// concurrent sessions can't interleave appends. Nothing coordinates with
// other processes: two processes sharing a data directory can still lose
// updates, and positional row ids can point at a different row after another
// writer's change. Run a single server per data directory.

pub mod records;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub use records::{
    CareerInterest, CareerRequest, Country, EducationLevel, Interest, Interests,
    MentorshipRequest, PreferredComms, RequestStatus,
};

/// A row type persisted in a record store
pub trait Record: Serialize + DeserializeOwned + Clone + Send {
    /// Short name for logs
    const KIND: &'static str;
    /// Backing file name inside the data directory
    const FILE_NAME: &'static str;
    /// Header row, in column order
    const COLUMNS: &'static [&'static str];

    /// Submission time, used for dashboard ordering
    fn timestamp(&self) -> NaiveDateTime;
}

/// Errors from reading or writing a store
#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure (permissions, disk full, ...)
    Io { path: PathBuf, source: std::io::Error },
    /// File exists but a row couldn't be parsed/written
    Csv { path: PathBuf, source: csv::Error },
    /// Positional update outside the table
    IndexOutOfRange { index: usize, len: usize },
    /// Another thread panicked mid-write
    Poisoned,
    /// The blocking task running the operation panicked or was cancelled
    Interrupted(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            Self::Csv { path, source } => write!(f, "CSV error in {}: {}", path.display(), source),
            Self::IndexOutOfRange { index, len } => {
                if *len == 0 {
                    write!(f, "Request ID {} out of range (store is empty)", index)
                } else {
                    write!(
                        f,
                        "Request ID {} out of range (valid: 0..={})",
                        index,
                        len - 1
                    )
                }
            }
            Self::Poisoned => write!(f, "Store lock poisoned"),
            Self::Interrupted(reason) => write!(f, "Store task interrupted: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Run a store operation on tokio's blocking pool
///
/// Every operation rewrites or rereads a whole file, so async callers hand
/// it off instead of stalling a runtime worker.
pub async fn blocking<T, F>(op: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| StoreError::Interrupted(e.to_string()))?
}

/// CSV-backed table of one record kind
pub struct RecordStore<R: Record> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RecordStore<R> {
    /// Store at `<data_dir>/<R::FILE_NAME>`. The file is created on first write.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::at_path(data_dir.join(R::FILE_NAME))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fixed column schema for this kind
    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    /// Read every row. A missing file is an empty table, not an error.
    pub fn load_all(&self) -> Result<Vec<R>, StoreError> {
        let mut reader = match csv::Reader::from_path(&self.path) {
            Ok(reader) => reader,
            Err(e) => {
                if let csv::ErrorKind::Io(io) = e.kind() {
                    if io.kind() == std::io::ErrorKind::NotFound {
                        return Ok(Vec::new());
                    }
                }
                return Err(self.csv_error(e));
            }
        };

        reader
            .deserialize()
            .collect::<Result<Vec<R>, _>>()
            .map_err(|e| self.csv_error(e))
    }

    /// Add one row at the end. Returns the new row's positional index.
    pub fn append(&self, record: R) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut rows = self.load_all()?;
        rows.push(record);
        self.write_all(&rows)?;

        let index = rows.len() - 1;
        tracing::debug!(kind = R::KIND, index, path = %self.path.display(), "Record appended");
        Ok(index)
    }

    /// Mutate the row at `index` in place and rewrite the file
    fn modify_at<F>(&self, index: usize, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut R),
    {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut rows = self.load_all()?;
        let len = rows.len();
        let row = rows
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        f(row);
        let updated = row.clone();

        self.write_all(&rows)?;
        Ok(updated)
    }

    /// Replace the file with header + rows
    fn write_all(&self, rows: &[R]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)
                .map_err(|e| self.csv_error(e))?;

            writer
                .write_record(R::COLUMNS)
                .map_err(|e| self.csv_error(e))?;
            for row in rows {
                writer.serialize(row).map_err(|e| self.csv_error(e))?;
            }
            writer.flush().map_err(|e| self.io_error(e))?;
        }

        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore<MentorshipRequest> {
    /// Admin update of a mentorship request, addressed by row position.
    ///
    /// Row position is the only identity a request has: if rows shift between
    /// reading the dashboard and calling this, the wrong row is updated.
    pub fn update_by_index(
        &self,
        index: usize,
        status: RequestStatus,
        notes: &str,
    ) -> Result<MentorshipRequest, StoreError> {
        let updated = self.modify_at(index, |row| {
            row.status = status;
            row.notes = notes.to_string();
        })?;

        tracing::info!(index, status = %status, "Mentorship request updated");
        Ok(updated)
    }
}
