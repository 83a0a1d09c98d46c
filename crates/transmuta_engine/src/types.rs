use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use transmuta_core::{Category, ConvertedPayload, ItemId};

/// One unit of work handed to the engine: everything a strategy needs,
/// detached from the live item so removal cannot race the conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    pub item_id: ItemId,
    pub source: Bytes,
    pub category: Category,
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Source bytes could not be interpreted as the category's content.
    Decode,
    /// The composited surface could not be serialized to the target type.
    Encode,
    /// Defensive fallback; unreachable through registry-filtered dispatch.
    UnsupportedContext,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Decode => write!(f, "decode failure"),
            FailureKind::Encode => write!(f, "encode failure"),
            FailureKind::UnsupportedContext => write!(f, "unsupported conversion context"),
        }
    }
}

/// Item-scoped conversion failure; never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ConvertError {
    pub kind: FailureKind,
    pub message: String,
}

impl ConvertError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine began converting a dispatched item.
    Started { item_id: ItemId },
    /// Synthetic progress estimate; real byte-level progress is not
    /// observable through the strategy contract.
    Progress { item_id: ItemId, increment: u8 },
    /// Terminal event for a dispatched item.
    Finished {
        item_id: ItemId,
        result: Result<ConvertedPayload, ConvertError>,
    },
}
