//! Editor Errors

use crate::model::{CardKey, ContainerId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("unknown container {0:?}")]
    UnknownContainer(ContainerId),
    #[error("unknown card {0:?}")]
    UnknownItem(CardKey),
    /// Structural edits wait until the pending save answers
    #[error("a save is in flight")]
    SaveInFlight,
    /// The last save failed; reload from the server before saving again
    #[error("local snapshot is stale, reload before saving")]
    StaleSnapshot,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type EditResult<T> = Result<T, EditError>;
