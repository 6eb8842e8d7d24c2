use serde::{Deserialize, Serialize};

/// The only media type admitted into a file selection.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Merge,
    Watermark,
}

impl OperationKind {
    pub fn cardinality(self) -> Cardinality {
        match self {
            OperationKind::Merge => Cardinality::AtLeast(2),
            OperationKind::Watermark => Cardinality::Exactly(1),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OperationKind::Merge => "Merge",
            OperationKind::Watermark => "Watermark",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Merge => "merge",
            OperationKind::Watermark => "watermark",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File-count rule an operation must satisfy before it may be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "count", rename_all = "snake_case")]
pub enum Cardinality {
    AtLeast(usize),
    Exactly(usize),
}

impl Cardinality {
    pub fn admits(self, count: usize) -> bool {
        match self {
            Cardinality::AtLeast(min) => count >= min,
            Cardinality::Exactly(n) => count == n,
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::AtLeast(min) => write!(f, "at least {min}"),
            Cardinality::Exactly(n) => write!(f, "exactly {n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
}

impl ToastMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
        }
    }
}

/// Action tiles offered on the main screen. Only merge and watermark are wired;
/// the remaining slots are shown disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSlot {
    Merge,
    Watermark,
    Split,
    MoreTools,
}

impl ToolSlot {
    pub const ALL: [ToolSlot; 4] = [
        ToolSlot::Merge,
        ToolSlot::Watermark,
        ToolSlot::Split,
        ToolSlot::MoreTools,
    ];

    pub fn operation(self) -> Option<OperationKind> {
        match self {
            ToolSlot::Merge => Some(OperationKind::Merge),
            ToolSlot::Watermark => Some(OperationKind::Watermark),
            ToolSlot::Split | ToolSlot::MoreTools => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolSlot::Merge => "Merge",
            ToolSlot::Watermark => "Watermark",
            ToolSlot::Split => "Split (Soon)",
            ToolSlot::MoreTools => "More \u{2192}",
        }
    }
}
