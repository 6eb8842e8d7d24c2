//! Backend-to-UI events.

use client_core::OperationResult;
use shared::protocol::HealthResponse;

pub enum UiEvent {
    Finished(OperationResult),
    Health(Result<HealthResponse, String>),
    BackendUnavailable(String),
}

/// One-line summary of a health probe for the status bar.
pub fn describe_health(result: &Result<HealthResponse, String>) -> String {
    match result {
        Ok(health) => format!(
            "Service online: {} ({} file(s) in temp)",
            health.status, health.files_in_temp
        ),
        Err(reason) => format!("Service unreachable: {reason}"),
    }
}
