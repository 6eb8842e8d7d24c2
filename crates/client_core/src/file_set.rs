//! Ordered selection of PDF files awaiting an operation.

use std::{path::Path, sync::Arc};

use shared::domain::PDF_MEDIA_TYPE;

use crate::error::WorkflowError;

/// A file offered by a drop or a picker, before admission.
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub media_type: Option<String>,
    pub data: Arc<[u8]>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, media_type: Option<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            media_type,
            data: data.into(),
        }
    }

    /// Builds a candidate whose media type is guessed from the file extension.
    pub fn from_path_bytes(path: &Path, data: impl Into<Arc<[u8]>>) -> Self {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();
        let media_type = mime_guess::from_path(path).first_raw().map(str::to_string);
        Self::new(name, media_type, data)
    }

    pub async fn read_from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::from_path_bytes(path, bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type
            .as_deref()
            .map(|mime| mime.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
    }
}

#[derive(Clone)]
pub struct SelectedFile {
    name: String,
    data: Arc<[u8]>,
}

impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.data.len())
            .finish()
    }
}

impl SelectedFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<SelectedFile>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole selection with the PDF subset of `candidates`.
    ///
    /// Order is preserved and duplicate names are kept. When no candidate is a
    /// PDF the current selection is left untouched.
    pub fn replace(&mut self, candidates: Vec<FileCandidate>) -> Result<usize, WorkflowError> {
        let offered = candidates.len();
        let admitted: Vec<SelectedFile> = candidates
            .into_iter()
            .filter(FileCandidate::is_pdf)
            .map(|candidate| SelectedFile {
                name: candidate.name,
                data: candidate.data,
            })
            .collect();

        if admitted.is_empty() {
            tracing::debug!(offered, "selection rejected: no pdf candidates");
            return Err(WorkflowError::InvalidSelection);
        }

        tracing::debug!(
            offered,
            admitted = admitted.len(),
            "selection replaced"
        );
        self.files = admitted;
        Ok(self.files.len())
    }

    pub fn remove_at(&mut self, index: usize) -> Result<SelectedFile, WorkflowError> {
        if index >= self.files.len() {
            return Err(WorkflowError::IndexOutOfBounds {
                index,
                len: self.files.len(),
            });
        }
        Ok(self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SelectedFile> {
        self.files.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectedFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(SelectedFile::name).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.files.iter().map(SelectedFile::size).sum()
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a SelectedFile;
    type IntoIter = std::slice::Iter<'a, SelectedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

pub fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if (value - value.round()).abs() < 0.05 {
        format!("{} {}", value.round() as u64, UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
#[path = "tests/file_set_tests.rs"]
mod tests;
