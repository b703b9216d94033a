//! Fresh variable names for rule patterns

use std::sync::Arc;

/// Variable bound to the focus node in every query
pub const FOCUS_VAR: &str = "x";

/// What a generated variable witnesses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// A value required by a min constraint (`v{n}`)
    Validation,
    /// One of the `max + 1` distinct values refuting a max constraint (`w{n}`)
    Violation,
}

/// Counter handing out variable names, one per compilation
///
/// Names are unique within the generator, so patterns compiled with the same
/// generator never capture each other's variables.
#[derive(Debug, Default)]
pub struct VariableGenerator {
    next_validation: usize,
    next_violation: usize,
}

impl VariableGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Arc<str> {
        Arc::from(FOCUS_VAR)
    }

    pub fn fresh(&mut self, kind: VariableKind) -> Arc<str> {
        match kind {
            VariableKind::Validation => {
                let n = self.next_validation;
                self.next_validation += 1;
                Arc::from(format!("v{n}"))
            }
            VariableKind::Violation => {
                let n = self.next_violation;
                self.next_violation += 1;
                Arc::from(format!("w{n}"))
            }
        }
    }

    /// `count` fresh variables of one kind
    pub fn fresh_n(&mut self, kind: VariableKind, count: usize) -> Vec<Arc<str>> {
        (0..count).map(|_| self.fresh(kind)).collect()
    }
}
