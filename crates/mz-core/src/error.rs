//! Error types for the core data model.

use thiserror::Error;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when parsing or validating core data.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A control-kind string did not match `player` or `ai`.
    #[error("unknown control kind: {0}")]
    UnknownControlKind(String),

    /// A role string did not match `player`, `companion`, or `npc`.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// An action label did not match any supported action kind.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}
