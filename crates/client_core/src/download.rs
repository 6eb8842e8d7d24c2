//! Saving returned payloads as user-visible files.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::error::DownloadError;

const MAX_NAME_ATTEMPTS: u32 = 1000;

pub trait DownloadSink: Send {
    /// Persists `payload` under a name derived from `filename` and returns the
    /// final location.
    fn save(&mut self, payload: &[u8], filename: &str) -> Result<PathBuf, DownloadError>;
}

/// Writes downloads into a directory, the way a browser drops files into its
/// download folder.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `filename`, then `stem (1).ext`, `stem (2).ext` and so on.
fn candidate_names(filename: &str) -> impl Iterator<Item = String> + '_ {
    let (stem, ext) = split_extension(filename);
    std::iter::once(filename.to_string()).chain((1..MAX_NAME_ATTEMPTS).map(move |n| match ext {
        Some(ext) => format!("{stem} ({n}).{ext}"),
        None => format!("{stem} ({n})"),
    }))
}

fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

/// Fully written download under a hidden name. Always removed on drop; the
/// visible name is a hard link created by [`publish`](Self::publish).
struct TransientFile {
    path: PathBuf,
}

impl TransientFile {
    fn create(path: PathBuf, payload: &[u8]) -> Result<Self, DownloadError> {
        let transient = Self { path };
        let mut file = fs::File::create(&transient.path).map_err(|source| DownloadError::Write {
            path: transient.path.clone(),
            source,
        })?;
        file.write_all(payload)
            .and_then(|()| file.sync_all())
            .map_err(|source| DownloadError::Write {
                path: transient.path.clone(),
                source,
            })?;
        Ok(transient)
    }

    /// Links the payload under the first free name in `dir`. Linking fails
    /// when the name is taken, so a file that appears concurrently is never
    /// replaced.
    fn publish(self, dir: &Path, filename: &str) -> Result<PathBuf, DownloadError> {
        for name in candidate_names(filename) {
            let target = dir.join(name);
            match fs::hard_link(&self.path, &target) {
                Ok(()) => return Ok(target),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(DownloadError::Write { path: target, source }),
            }
        }
        Err(DownloadError::NameExhausted(filename.to_string()))
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), "failed to remove partial download: {err}");
            }
        }
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, payload: &[u8], filename: &str) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(&self.dir).map_err(|source| DownloadError::Directory {
            path: self.dir.clone(),
            source,
        })?;

        let partial = self.dir.join(format!(".{filename}.part"));
        let transient = TransientFile::create(partial, payload)?;
        let target = transient.publish(&self.dir, filename)?;
        tracing::info!(path = %target.display(), bytes = payload.len(), "download saved");
        Ok(target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub filename: String,
    pub payload: Vec<u8>,
}

/// Keeps downloads in memory; used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub saved: Vec<SavedDownload>,
    pub fail_with: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            saved: Vec::new(),
            fail_with: Some(reason.into()),
        }
    }
}

impl DownloadSink for MemorySink {
    fn save(&mut self, payload: &[u8], filename: &str) -> Result<PathBuf, DownloadError> {
        if let Some(reason) = &self.fail_with {
            return Err(DownloadError::Write {
                path: PathBuf::from(filename),
                source: std::io::Error::new(ErrorKind::Other, reason.clone()),
            });
        }
        self.saved.push(SavedDownload {
            filename: filename.to_string(),
            payload: payload.to_vec(),
        });
        Ok(PathBuf::from(filename))
    }
}

#[cfg(test)]
#[path = "tests/download_tests.rs"]
mod tests;
