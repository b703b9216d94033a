//! Validation run configuration

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Result, ValidationError};

fn default_target_variable() -> Arc<str> {
    Arc::from("x")
}

fn default_max_concurrent_queries() -> usize {
    1
}

/// Options for one validation run
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use shacl_rule_engine::ValidationOptions;
///
/// let opts = ValidationOptions::from_json(r#"{"maxConcurrentQueries": 4}"#).unwrap();
/// assert_eq!(opts.max_concurrent_queries, 4);
/// assert_eq!(opts.target_variable.as_ref(), "x");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    /// Variable whose bindings in a target query name the target nodes
    #[serde(default = "default_target_variable")]
    pub target_variable: Arc<str>,

    /// Queries of one wave dispatched at once. Grounding stays serial.
    #[serde(default = "default_max_concurrent_queries")]
    pub max_concurrent_queries: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            target_variable: default_target_variable(),
            max_concurrent_queries: default_max_concurrent_queries(),
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and check options from a JSON object
    pub fn from_json(json: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(json)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_target_variable(mut self, var: impl Into<Arc<str>>) -> Self {
        self.target_variable = var.into();
        self
    }

    pub fn with_max_concurrent_queries(mut self, n: usize) -> Self {
        self.max_concurrent_queries = n;
        self
    }

    /// Reject option values the validator cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent_queries == 0 {
            return Err(ValidationError::invalid_options(
                "maxConcurrentQueries must be at least 1",
            ));
        }
        if self.target_variable.is_empty() {
            return Err(ValidationError::invalid_options(
                "targetVariable must not be empty",
            ));
        }
        Ok(())
    }
}
