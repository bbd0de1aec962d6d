//! Error types for query planning.

use thiserror::Error;

/// Errors that stop planning before any table is read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The request contained no usable token.
    #[error("no valid field identifiers or names were supplied")]
    NoValidTokens,
}

pub type Result<T> = std::result::Result<T, PlanError>;
