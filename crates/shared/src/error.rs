use serde::{Deserialize, Serialize};

/// Coarse classification of everything that can go wrong in the selection and
/// dispatch workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidSelection,
    PreconditionViolation,
    TransportFailure,
    /// Silent early exit; never shown to the user.
    UserAbort,
    Busy,
    OutOfBounds,
}

impl FailureKind {
    pub fn is_silent(self) -> bool {
        matches!(self, FailureKind::UserAbort)
    }
}
