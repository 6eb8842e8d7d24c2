//! Multipart HTTP exchange with the remote PDF service.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::protocol::{Endpoint, HealthResponse};

use crate::{config::ClientSettings, error::TransportError};

#[derive(Debug, Clone)]
pub enum FormPart {
    File {
        field: &'static str,
        filename: String,
        media_type: &'static str,
        data: Arc<[u8]>,
    },
    Text {
        field: &'static str,
        value: String,
    },
}

/// A fully packaged upload: target endpoint plus ordered multipart fields.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub endpoint: Endpoint,
    pub parts: Vec<FormPart>,
}

impl UploadRequest {
    pub fn payload_bytes(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                FormPart::File { data, .. } => data.len(),
                FormPart::Text { value, .. } => value.len(),
            })
            .sum()
    }
}

#[async_trait]
pub trait PdfService: Send + Sync {
    /// Sends the upload and returns the response body of a 2xx reply.
    async fn submit(&self, upload: UploadRequest) -> Result<Vec<u8>, TransportError>;
    async fn health(&self) -> Result<HealthResponse, TransportError>;
}

pub struct HttpPdfService {
    http: Client,
    base_url: String,
}

impl HttpPdfService {
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;
        Ok(Self {
            http,
            base_url: settings.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn build_form(parts: Vec<FormPart>) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for part in parts {
            form = match part {
                FormPart::File {
                    field,
                    filename,
                    media_type,
                    data,
                } => {
                    let file_part = Part::bytes(data.to_vec())
                        .file_name(filename)
                        .mime_str(media_type)
                        .map_err(|err| TransportError::Request(err.to_string()))?;
                    form.part(field, file_part)
                }
                FormPart::Text { field, value } => form.text(field, value),
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl PdfService for HttpPdfService {
    async fn submit(&self, upload: UploadRequest) -> Result<Vec<u8>, TransportError> {
        let url = self.url(upload.endpoint);
        let payload_bytes = upload.payload_bytes();
        let form = Self::build_form(upload.parts)?;
        let started = Instant::now();

        tracing::info!(%url, payload_bytes, "submitting upload");
        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                %url,
                status = status.as_u16(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "service rejected upload"
            );
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        tracing::info!(
            %url,
            status = status.as_u16(),
            response_bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "upload completed"
        );
        Ok(body.to_vec())
    }

    async fn health(&self) -> Result<HealthResponse, TransportError> {
        let body: HealthResponse = self
            .http
            .get(self.url(Endpoint::Health))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
