//! # SHACL Rule Engine
//!
//! Incremental, rule-based validation of recursive shape schemas against a
//! SPARQL endpoint.
//!
//! Shapes are compiled (see the `shacl-rule-schema` crate) into queries whose
//! solutions ground propositional rules over literals such as `Person(n1)`.
//! The validator queries shapes wave by wave, grounds every solution into a
//! [`RuleMap`], and saturates the rules under closed-world
//! negation-as-failure until each target is decided.
//!
//! This crate provides:
//! - Literals, rule patterns and the pending-rule store
//! - The saturation engine (rule application + negation-as-failure)
//! - The wave scheduler ([`Validator`])
//! - The [`QueryExecutor`] seam and an in-memory endpoint
//! - Observer callbacks and run diagnostics
//!
//! ## Key Types
//!
//! - [`Literal`]: signed ground fact `predicate(argument)`
//! - [`RulePattern`]: rule template grounded once per solution mapping
//! - [`RuleMap`]: pending rules, head to alternative bodies
//! - [`Assignment`]: decided literals, never both a literal and its negation
//! - [`Schema`]: compiled shapes with their queries, patterns and predicates
//! - [`ValidationReport`]: valid and invalid targets plus diagnostics
//!
//! ## Example
//!
//! ```ignore
//! use shacl_rule_engine::{MemoryEndpoint, ValidationOptions, Validator};
//!
//! let validator = Validator::new(schema, endpoint)
//!     .with_options(ValidationOptions::new().with_max_concurrent_queries(4));
//!
//! let report = validator.validate().await?;
//! for target in &report.invalid {
//!     println!("violation: {target}");
//! }
//! ```

pub mod assignment;
pub mod binding;
pub mod diagnostics;
pub mod endpoint;
pub mod error;
pub mod literal;
pub mod observer;
pub mod options;
pub mod pattern;
pub mod report;
pub mod rule_map;
pub mod saturate;
pub mod schema;
pub mod state;
pub mod validator;

pub use assignment::Assignment;
pub use binding::Binding;
pub use diagnostics::{QueryStats, SaturationStats, ValidationDiagnostics, WaveStats};
pub use endpoint::{MemoryEndpoint, QueryExecutor};
pub use error::{MissingBinding, Result, ValidationError};
pub use literal::{Literal, LiteralTemplate};
pub use observer::{NoopObserver, RecordingObserver, ValidationObserver};
pub use options::ValidationOptions;
pub use pattern::{instantiate_literal, RulePattern};
pub use report::ValidationReport;
pub use rule_map::{RuleBody, RuleMap};
pub use saturate::{saturate, Saturator};
pub use schema::{Conjunction, Query, Schema, Shape};
pub use state::{EvalState, TargetSet, Verdict};
pub use validator::Validator;
