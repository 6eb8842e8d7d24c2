//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{OperationJob, OperationResult, TransportError, WorkflowError};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `job` for the backend. When the queue cannot take it the job is
/// dropped, which releases the busy flag, and a failed result is returned for
/// the controller to report.
pub fn submit_job(cmd_tx: &Sender<BackendCommand>, job: OperationJob) -> Result<(), OperationResult> {
    let rejected = match cmd_tx.try_send(BackendCommand::Execute(job)) {
        Ok(()) => {
            tracing::debug!(command = "execute", "queued ui->backend command");
            return Ok(());
        }
        Err(TrySendError::Full(cmd)) => (cmd, "backend command queue is full"),
        Err(TrySendError::Disconnected(cmd)) => (cmd, "backend command processor disconnected"),
    };

    match rejected {
        (BackendCommand::Execute(job), reason) => {
            tracing::error!("could not queue operation: {reason}");
            let operation = job.kind();
            drop(job);
            Err(OperationResult::Failed {
                operation,
                error: WorkflowError::Transport {
                    operation,
                    source: TransportError::Request(reason.to_string()),
                },
            })
        }
        (other, reason) => {
            tracing::error!(command = other.name(), "could not queue command: {reason}");
            Ok(())
        }
    }
}

pub fn request_health(cmd_tx: &Sender<BackendCommand>) -> Result<(), String> {
    match cmd_tx.try_send(BackendCommand::CheckHealth) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => Err("UI command queue is full; please retry".to_string()),
        Err(TrySendError::Disconnected(_)) => {
            Err("Backend command processor disconnected".to_string())
        }
    }
}
