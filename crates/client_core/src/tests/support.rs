//! Fakes shared by the unit tests of several modules.

use std::sync::Arc;

use async_trait::async_trait;
use shared::protocol::HealthResponse;
use tokio::sync::{Mutex, Notify};

use crate::{
    error::TransportError,
    file_set::{FileCandidate, FileSet},
    transport::{PdfService, UploadRequest},
};

pub struct RecordingService {
    pub uploads: Arc<Mutex<Vec<UploadRequest>>>,
    response: Result<Vec<u8>, u16>,
    gate: Option<Arc<Notify>>,
}

impl RecordingService {
    pub fn ok(body: &[u8]) -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            response: Ok(body.to_vec()),
            gate: None,
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            response: Err(code),
            gate: None,
        }
    }

    /// Holds every submission until the gate is notified.
    pub fn gated(body: &[u8], gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::ok(body)
        }
    }
}

#[async_trait]
impl PdfService for RecordingService {
    async fn submit(&self, upload: UploadRequest) -> Result<Vec<u8>, TransportError> {
        self.uploads.lock().await.push(upload);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(code) => Err(TransportError::Status(*code)),
        }
    }

    async fn health(&self) -> Result<HealthResponse, TransportError> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            files_in_temp: 0,
        })
    }
}

pub fn pdf_set(names: &[&str]) -> FileSet {
    let mut set = FileSet::new();
    if names.is_empty() {
        return set;
    }
    set.replace(
        names
            .iter()
            .map(|name| {
                FileCandidate::new(
                    *name,
                    Some("application/pdf".to_string()),
                    format!("%PDF {name}").into_bytes(),
                )
            })
            .collect(),
    )
    .expect("pdf set");
    set
}

