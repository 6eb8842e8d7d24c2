//! Validation, packaging and submission of merge/watermark operations.
//!
//! A dispatch moves through
//! `Idle -> Validating -> (Rejected | [AwaitingText ->] Packaging -> Submitting -> (Succeeded | Failed))`.
//! Validation here is authoritative: hosts may grey out controls, but every
//! request is re-checked before anything touches the network.

use std::{sync::Arc, time::Instant};

use shared::{
    domain::{OperationKind, PDF_MEDIA_TYPE},
    protocol::{
        Endpoint, MERGED_FILENAME, MERGE_FILES_FIELD, WATERMARKED_PREFIX, WATERMARK_FILE_FIELD,
        WATERMARK_TEXT_FIELD,
    },
};

use crate::{
    busy::{cancel_pair, BusyFlag, BusyGuard, CancelHandle, CancelToken},
    error::{TransportError, WorkflowError},
    file_set::{FileSet, SelectedFile},
    transport::{FormPart, PdfService, UploadRequest},
};

const MAX_FILENAME_TEXT_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Validating,
    AwaitingText,
    Rejected,
    Packaging,
    Submitting,
    Succeeded,
    Failed,
}

impl DispatchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DispatchPhase::Rejected | DispatchPhase::Succeeded | DispatchPhase::Failed
        )
    }
}

pub fn validate(kind: OperationKind, files: &FileSet) -> Result<(), WorkflowError> {
    check_cardinality(kind, files.len())
}

fn check_cardinality(kind: OperationKind, found: usize) -> Result<(), WorkflowError> {
    let required = kind.cardinality();
    if required.admits(found) {
        Ok(())
    } else {
        Err(WorkflowError::PreconditionViolation {
            operation: kind,
            required,
            found,
        })
    }
}

#[derive(Debug, Clone)]
pub enum OperationRequest {
    Merge { files: Vec<SelectedFile> },
    Watermark { file: SelectedFile, text: String },
}

impl OperationRequest {
    pub fn merge(files: &FileSet) -> Result<Self, WorkflowError> {
        validate(OperationKind::Merge, files)?;
        Ok(OperationRequest::Merge {
            files: files.as_slice().to_vec(),
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::Merge { .. } => OperationKind::Merge,
            OperationRequest::Watermark { .. } => OperationKind::Watermark,
        }
    }

    pub fn file_count(&self) -> usize {
        match self {
            OperationRequest::Merge { files } => files.len(),
            OperationRequest::Watermark { .. } => 1,
        }
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        check_cardinality(self.kind(), self.file_count())?;
        if let OperationRequest::Watermark { text, .. } = self {
            if text.trim().is_empty() {
                return Err(WorkflowError::UserAbort);
            }
        }
        Ok(())
    }

    pub fn output_filename(&self) -> String {
        match self {
            OperationRequest::Merge { .. } => MERGED_FILENAME.to_string(),
            OperationRequest::Watermark { text, .. } => watermarked_filename(text),
        }
    }

    /// Lays the request out as multipart fields. Merge parts follow selection
    /// order, which becomes the page order of the merged document.
    pub fn package(&self) -> UploadRequest {
        let parts = match self {
            OperationRequest::Merge { files } => files
                .iter()
                .map(|file| file_part(MERGE_FILES_FIELD, file))
                .collect(),
            OperationRequest::Watermark { file, text } => vec![
                file_part(WATERMARK_FILE_FIELD, file),
                FormPart::Text {
                    field: WATERMARK_TEXT_FIELD,
                    value: text.clone(),
                },
            ],
        };
        UploadRequest {
            endpoint: Endpoint::for_operation(self.kind()),
            parts,
        }
    }
}

fn file_part(field: &'static str, file: &SelectedFile) -> FormPart {
    FormPart::File {
        field,
        filename: file.name().to_string(),
        media_type: PDF_MEDIA_TYPE,
        data: Arc::clone(file.data()),
    }
}

/// A watermark that passed validation and is waiting for its text.
#[derive(Debug, Clone)]
pub struct PendingWatermark {
    file: SelectedFile,
}

impl PendingWatermark {
    pub fn begin(files: &FileSet) -> Result<Self, WorkflowError> {
        validate(OperationKind::Watermark, files)?;
        let file = files
            .get(0)
            .cloned()
            .ok_or(WorkflowError::PreconditionViolation {
                operation: OperationKind::Watermark,
                required: OperationKind::Watermark.cardinality(),
                found: 0,
            })?;
        Ok(Self { file })
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    /// `None`, empty or whitespace-only text ends the operation as a silent abort.
    pub fn provide_text(self, text: Option<String>) -> Result<OperationRequest, WorkflowError> {
        match text {
            Some(text) if !text.trim().is_empty() => Ok(OperationRequest::Watermark {
                file: self.file,
                text,
            }),
            _ => Err(WorkflowError::UserAbort),
        }
    }
}

/// Name offered for a watermarked download. The user's text is reduced to
/// characters that are safe in a file name.
pub fn watermarked_filename(text: &str) -> String {
    let safe = sanitize_filename_component(text);
    if safe.is_empty() {
        format!("{WATERMARKED_PREFIX}.pdf")
    } else {
        format!("{WATERMARKED_PREFIX}_{safe}.pdf")
    }
}

pub fn sanitize_filename_component(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => Some('_'),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    let trimmed = replaced.trim().trim_matches('.').trim();
    trimmed.chars().take(MAX_FILENAME_TEXT_CHARS).collect()
}

/// A request that holds the busy flag and may be cancelled.
#[derive(Debug)]
pub struct OperationJob {
    request: OperationRequest,
    busy: BusyGuard,
    cancel: CancelToken,
}

impl OperationJob {
    pub fn request(&self) -> &OperationRequest {
        &self.request
    }

    pub fn kind(&self) -> OperationKind {
        self.request.kind()
    }
}

#[derive(Debug)]
pub enum OperationResult {
    Succeeded {
        operation: OperationKind,
        payload: Vec<u8>,
        filename: String,
    },
    Failed {
        operation: OperationKind,
        error: WorkflowError,
    },
}

impl OperationResult {
    pub fn operation(&self) -> OperationKind {
        match self {
            OperationResult::Succeeded { operation, .. }
            | OperationResult::Failed { operation, .. } => *operation,
        }
    }

    pub fn phase(&self) -> DispatchPhase {
        match self {
            OperationResult::Succeeded { .. } => DispatchPhase::Succeeded,
            OperationResult::Failed { .. } => DispatchPhase::Failed,
        }
    }
}

#[derive(Clone)]
pub struct OperationDispatcher {
    service: Arc<dyn PdfService>,
    busy: BusyFlag,
}

impl OperationDispatcher {
    pub fn new(service: Arc<dyn PdfService>) -> Self {
        Self {
            service,
            busy: BusyFlag::new(),
        }
    }

    pub fn busy_flag(&self) -> &BusyFlag {
        &self.busy
    }

    pub fn service(&self) -> &Arc<dyn PdfService> {
        &self.service
    }

    /// Re-validates `request` and claims the busy flag for it.
    pub fn start(
        &self,
        request: OperationRequest,
    ) -> Result<(OperationJob, CancelHandle), WorkflowError> {
        request.validate()?;
        let busy = self.busy.try_acquire().ok_or(WorkflowError::Busy)?;
        let (handle, cancel) = cancel_pair();
        tracing::debug!(operation = %request.kind(), files = request.file_count(), "operation started");
        Ok((
            OperationJob {
                request,
                busy,
                cancel,
            },
            handle,
        ))
    }

    /// Runs the network exchange. The busy flag is released when this returns,
    /// on every outcome.
    pub async fn execute(&self, job: OperationJob) -> OperationResult {
        let OperationJob {
            request,
            busy,
            mut cancel,
        } = job;
        let operation = request.kind();
        let filename = request.output_filename();

        tracing::debug!(%operation, phase = ?DispatchPhase::Packaging, "dispatch phase");
        let upload = request.package();
        drop(request);

        tracing::debug!(%operation, phase = ?DispatchPhase::Submitting, "dispatch phase");
        let started = Instant::now();
        let outcome = tokio::select! {
            result = self.service.submit(upload) => result,
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
        };
        drop(busy);

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(payload) => {
                tracing::info!(%operation, elapsed_ms, bytes = payload.len(), "operation succeeded");
                OperationResult::Succeeded {
                    operation,
                    payload,
                    filename,
                }
            }
            Err(source) => {
                tracing::warn!(%operation, elapsed_ms, "operation failed: {source}");
                OperationResult::Failed {
                    operation,
                    error: WorkflowError::Transport { operation, source },
                }
            }
        }
    }

    /// `start` and `execute` in one step.
    pub async fn dispatch(&self, request: OperationRequest) -> Result<OperationResult, WorkflowError> {
        let (job, _handle) = self.start(request)?;
        Ok(self.execute(job).await)
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
