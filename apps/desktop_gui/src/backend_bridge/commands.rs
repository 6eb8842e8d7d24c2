//! Backend commands queued from UI to backend worker.

use client_core::OperationJob;

pub enum BackendCommand {
    /// Runs a validated job that already holds the busy flag.
    Execute(OperationJob),
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Execute(_) => "execute",
            BackendCommand::CheckHealth => "check_health",
        }
    }
}
