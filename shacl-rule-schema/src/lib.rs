//! # SHACL Rule Schema
//!
//! Shape definitions and their compilation into a [`shacl_rule_engine::Schema`].
//!
//! A shape is a disjunction of conjunctions of constraints. Constraints are
//! first normalized into atomic min, max and local kinds, then compiled into
//! queries and rule patterns:
//!
//! - min queries derive `c_pos(x)` from the values a conjunction requires
//! - max queries witness too many values, deriving `c_max_i(x)`
//! - `c(x) :- c_pos(x), !c_max_1(x), ..` and `S(x) :- c(x)` tie them together
//!
//! SPARQL rendering is delegated to a [`QueryWriter`].
//!
//! ## Example
//!
//! ```ignore
//! use shacl_rule_schema::{ConstraintDef, SchemaCompiler, ShapeDef};
//!
//! let person = ShapeDef::new("Person")
//!     .with_target("ex:Person")
//!     .with_disjunct([
//!         ConstraintDef::path("ex:name").min(1),
//!         ConstraintDef::path("ex:knows").min(1).shape("Person"),
//!     ]);
//!
//! let schema = SchemaCompiler::compile(&[person], &writer)?;
//! ```

pub mod compile;
pub mod constraint;
pub mod error;
pub mod vars;

pub use compile::{BoundConstraint, QuerySpec, QueryWriter, SchemaCompiler};
pub use constraint::{
    normalize, normalize_conjunction, AtomicConstraint, Cardinality, ConjunctionDef,
    ConstraintDef, LocalConstraint, NormalizedConjunction, ShapeDef,
};
pub use error::{Result, SchemaError};
pub use vars::{VariableGenerator, VariableKind, FOCUS_VAR};
