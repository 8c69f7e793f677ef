//! Error types for the rules crate.

use thiserror::Error;

/// Alias for `Result<T, RulesError>`.
pub type RulesResult<T> = Result<T, RulesError>;

/// Errors that can occur while evaluating rules.
#[derive(Debug, Error)]
pub enum RulesError {
    /// A dice-notation string could not be parsed as `NdM+k`.
    #[error("invalid dice notation: \"{0}\"")]
    InvalidNotation(String),
}
