use std::path::PathBuf;

use shared::{
    domain::{Cardinality, OperationKind},
    error::FailureKind,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("failed to connect: {0}")]
    Connect(String),
    #[error("request cancelled")]
    Cancelled,
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("failed to build http client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("no PDF files in selection")]
    InvalidSelection,
    #[error("{operation} requires {required} selected PDF(s), found {found}")]
    PreconditionViolation {
        operation: OperationKind,
        required: Cardinality,
        found: usize,
    },
    #[error("{operation} failed: {source}")]
    Transport {
        operation: OperationKind,
        #[source]
        source: TransportError,
    },
    #[error("operation aborted by user")]
    UserAbort,
    #[error("another operation is already in flight")]
    Busy,
    #[error("index {index} out of bounds for selection of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl WorkflowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            WorkflowError::InvalidSelection => FailureKind::InvalidSelection,
            WorkflowError::PreconditionViolation { .. } => FailureKind::PreconditionViolation,
            WorkflowError::Transport { .. } => FailureKind::TransportFailure,
            WorkflowError::UserAbort => FailureKind::UserAbort,
            WorkflowError::Busy => FailureKind::Busy,
            WorkflowError::IndexOutOfBounds { .. } => FailureKind::OutOfBounds,
        }
    }

    /// Text shown to the user. `None` for silent outcomes.
    ///
    /// Transport failures deliberately collapse to a per-operation message;
    /// nothing the service returned is echoed back.
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            WorkflowError::InvalidSelection => "Please select PDF files only".to_string(),
            WorkflowError::PreconditionViolation {
                operation: OperationKind::Merge,
                ..
            } => "Select at least 2 PDFs to merge".to_string(),
            WorkflowError::PreconditionViolation {
                operation: OperationKind::Watermark,
                ..
            } => "Select exactly 1 PDF for watermarking".to_string(),
            WorkflowError::Transport {
                operation,
                source: TransportError::Cancelled,
            } => format!("{} cancelled", operation.label()),
            WorkflowError::Transport { operation, .. } => format!("{} failed", operation.label()),
            WorkflowError::UserAbort => return None,
            WorkflowError::Busy => "An operation is already in progress".to_string(),
            WorkflowError::IndexOutOfBounds { .. } => "That file is no longer selected".to_string(),
        };
        Some(message)
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download directory '{}' is unavailable: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no free file name for '{0}'")]
    NameExhausted(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid api url '{value}': {source}")]
    ApiUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported api url scheme '{0}', expected http or https")]
    ApiUrlScheme(String),
    #[error("invalid value '{value}' for {key}")]
    InvalidNumber { key: &'static str, value: String },
}
