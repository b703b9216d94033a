//! Schema compilation error types

use std::sync::Arc;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while normalizing or compiling shape definitions
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A constraint cannot be normalized into an atomic kind
    #[error("Invalid constraint {constraint_id}: {message}")]
    InvalidConstraint {
        constraint_id: String,
        message: String,
    },

    /// Shape references unknown shape
    #[error("Shape {referrer} references unknown shape {referenced}")]
    UnknownShapeReference {
        referrer: Arc<str>,
        referenced: Arc<str>,
    },

    /// Two definitions share a shape id
    #[error("Shape {0} is defined more than once")]
    DuplicateShape(Arc<str>),

    /// A shape without any disjunct can never be satisfied nor queried
    #[error("Shape {0} has no disjuncts")]
    EmptyDisjunction(Arc<str>),

    /// The compiled schema was rejected by the engine
    #[error(transparent)]
    Engine(#[from] shacl_rule_engine::ValidationError),
}

impl SchemaError {
    /// Create an invalid constraint error
    pub fn invalid_constraint(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            constraint_id: id.into(),
            message: message.into(),
        }
    }
}
