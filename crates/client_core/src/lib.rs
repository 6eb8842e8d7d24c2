//! Client-side workflow for batch PDF operations against a PDF processing
//! service: file selection, operation dispatch, downloads and status toasts.

pub mod busy;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod download;
pub mod error;
pub mod file_set;
pub mod notifier;
pub mod transport;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use busy::{BusyFlag, CancelHandle};
pub use config::{load_settings, ClientSettings};
pub use controller::{ControllerView, InputEvent, InteractionController};
pub use dispatcher::{
    DispatchPhase, OperationDispatcher, OperationJob, OperationRequest, OperationResult,
    PendingWatermark,
};
pub use download::{DirectorySink, DownloadSink, MemorySink};
pub use error::{ConfigError, DownloadError, TransportError, WorkflowError};
pub use file_set::{human_readable_bytes, FileCandidate, FileSet, SelectedFile};
pub use notifier::Notifier;
pub use transport::{HttpPdfService, PdfService};
