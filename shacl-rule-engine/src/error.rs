//! Validation error types

use std::sync::Arc;
use thiserror::Error;

/// Result type for validation operations
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Errors that can abort a validation run or reject its inputs
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The query executor reported a transport or query failure.
    ///
    /// Fatal to the run: no partial verdict is produced.
    #[error("Endpoint failure while evaluating query {query_id}: {message}")]
    Endpoint { query_id: String, message: String },

    /// Two shapes claim the same predicate
    #[error("Predicate {predicate} is owned by both {first} and {second}")]
    DuplicatePredicate {
        predicate: Arc<str>,
        first: Arc<str>,
        second: Arc<str>,
    },

    /// A query or rule pattern of a shape derives a predicate the shape does
    /// not own, so it would never be closed
    #[error("Shape {shape} derives predicate {predicate} without owning it")]
    UnownedPredicate {
        shape: Arc<str>,
        predicate: Arc<str>,
    },

    /// A shape id appears more than once in a schema
    #[error("Shape {0} is defined more than once")]
    DuplicateShape(Arc<str>),

    /// Invalid validation options
    #[error("Invalid validation options: {0}")]
    InvalidOptions(String),

    /// Options could not be deserialized
    #[error("Failed to parse validation options: {0}")]
    Options(#[from] serde_json::Error),
}

impl ValidationError {
    /// Create an endpoint failure for the given query
    pub fn endpoint(query_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Endpoint {
            query_id: query_id.into(),
            message: message.into(),
        }
    }

    /// Create an invalid options error
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }
}

/// A rule template referenced a variable the solution mapping does not bind.
///
/// Callers that check coverage first (see [`crate::RulePattern::instantiate`])
/// never observe this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Variable ?{variable} is not bound")]
pub struct MissingBinding {
    pub variable: Arc<str>,
}
