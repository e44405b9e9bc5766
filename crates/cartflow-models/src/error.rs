use thiserror::Error;

/// Validation and lifecycle errors raised by model constructors.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid profile '{id}': {reason}")]
    InvalidProfile { id: String, reason: String },

    #[error("session '{session_id}' is already finalized")]
    SessionFinalized { session_id: String },
}
