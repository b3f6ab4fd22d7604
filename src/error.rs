//! Error types for plan operations

use chrono::NaiveDate;
use thiserror::Error;

use crate::block::CaregiverSlot;

/// Result type alias for plan operations
pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Errors raised by the planning core. Every operation that returns one of
/// these has left its input untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Malformed block or holiday input
    #[error("validation error: {0}")]
    Validation(String),

    /// Block reference outside the timeline
    #[error("block index {index} out of range (timeline has {len} blocks)")]
    InvalidIndex { index: usize, len: usize },

    /// Attempt to delete or illegally change the mandatory block
    #[error("immutable block: {0}")]
    ImmutableBlock(String),

    /// Birth date change would put the mandatory block over a later block
    #[error(
        "{caregiver} block {index} starts {start}, before the mandatory block now ending {mandatory_end}"
    )]
    MandatoryBlockConflict {
        caregiver: CaregiverSlot,
        index: usize,
        start: NaiveDate,
        mandatory_end: NaiveDate,
    },

    /// Corrupt persisted or imported plan data
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl PlanError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        PlanError::Validation(message.into())
    }

    pub(crate) fn immutable(message: impl Into<String>) -> Self {
        PlanError::ImmutableBlock(message.into())
    }

    pub(crate) fn deserialization(message: impl Into<String>) -> Self {
        PlanError::Deserialization(message.into())
    }
}
