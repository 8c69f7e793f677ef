//! Error types for the combat engine.
//!
//! Only truly unexpected failures surface here: a collaborator that failed,
//! or a session driven outside its lifecycle. Recoverable combat conditions
//! (ambiguous target, missing weapon, ...) are data — see
//! [`mz_core::ActionErrorCode`] — and never abort a call.

use thiserror::Error;

use crate::ports::OracleError;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while driving an encounter.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An external collaborator failed; the raw message is attached and the
    /// encounter state is unchanged.
    #[error("oracle failure: {0}")]
    Oracle(#[from] OracleError),

    /// A turn was processed with no encounter in progress.
    #[error("no encounter in progress")]
    NotInCombat,

    /// The initiative order is empty.
    #[error("empty initiative order")]
    EmptyOrder,

    /// Rules-level failure (unparseable dice notation reached the engine).
    #[error(transparent)]
    Rules(#[from] mz_rules::RulesError),
}
