use crate::error::IngestError;
use fs2::FileExt;
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable record of which source files have completed ingestion.
///
/// Persisted as a JSON array of file names, rewritten as a full snapshot on
/// every [`persist`](TrackedFiles::persist). A name belongs here only once
/// all of the file's chunks have been embedded and written to the index; a
/// crash between the index write and the snapshot means that file is
/// re-ingested on the next run (at-least-once, duplicates tolerated).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrackedFiles {
    files: BTreeSet<String>,
}

impl TrackedFiles {
    /// Reads the persisted snapshot. A missing file means nothing has been
    /// ingested yet and loads as the empty set; malformed JSON is an error.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let raw = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(error) => return Err(IngestError::Io(error)),
        };

        let names: Vec<String> = serde_json::from_slice(&raw)?;
        Ok(Self {
            files: names.into_iter().collect(),
        })
    }

    /// A file is eligible for ingestion iff it carries a PDF extension and
    /// its name has not been recorded. Membership is exact string equality
    /// on the file name: renaming or moving a file makes it new again.
    pub fn is_new(&self, file_name: &str) -> bool {
        has_pdf_extension(file_name) && !self.files.contains(file_name)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.contains(file_name)
    }

    /// Records a file as ingested. Callers must invoke this strictly after
    /// the file's chunks are in the index; the tracker never marks
    /// optimistically.
    pub fn mark_ingested(&mut self, file_name: &str) {
        self.files.insert(file_name.to_string());
    }

    /// Overwrites the snapshot with the full current set. Always a complete
    /// snapshot, never an append.
    pub fn persist(&self, path: &Path) -> Result<(), IngestError> {
        let names: Vec<&String> = self.files.iter().collect();
        let payload = serde_json::to_vec_pretty(&names)?;
        fs::write(path, payload)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }
}

fn has_pdf_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Exclusive advisory lock serializing ingestion runs that share a tracker
/// file. Two concurrent runs would race on read-modify-persist of the
/// snapshot and lose updates; the second run fails fast instead.
pub struct IngestLock {
    file: File,
}

impl IngestLock {
    pub fn acquire(tracker_path: &Path) -> Result<Self, IngestError> {
        let path = lock_path(tracker_path);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        file.try_lock_exclusive()
            .map_err(|_| IngestError::LockHeld(path.display().to_string()))?;

        Ok(Self { file })
    }
}

impl Drop for IngestLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn lock_path(tracker_path: &Path) -> PathBuf {
    let mut name = tracker_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "ingest".into());
    name.push(".lock");
    tracker_path.with_file_name(name)
}
