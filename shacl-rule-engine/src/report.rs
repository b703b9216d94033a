//! Final verdicts of a validation run

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::diagnostics::ValidationDiagnostics;
use crate::literal::Literal;
use crate::state::Verdict;

/// Valid and invalid partitions covering every extracted target
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: BTreeSet<Literal>,
    pub invalid: BTreeSet<Literal>,
    pub diagnostics: ValidationDiagnostics,
}

impl ValidationReport {
    pub fn new(
        valid: BTreeSet<Literal>,
        invalid: BTreeSet<Literal>,
        diagnostics: ValidationDiagnostics,
    ) -> Self {
        Self {
            valid,
            invalid,
            diagnostics,
        }
    }

    /// True when no target is invalid
    pub fn conforms(&self) -> bool {
        self.invalid.is_empty()
    }

    /// `Undetermined` only for literals that were never targets
    pub fn verdict(&self, target: &Literal) -> Verdict {
        if self.valid.contains(target) {
            Verdict::Valid
        } else if self.invalid.contains(target) {
            Verdict::Invalid
        } else {
            Verdict::Undetermined
        }
    }

    pub fn target_count(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    /// Focus nodes of `shape` that violate it, in order
    pub fn invalid_nodes<'a>(&'a self, shape: &'a str) -> impl Iterator<Item = &'a Arc<str>> + 'a {
        self.invalid
            .iter()
            .filter(move |t| t.predicate().as_ref() == shape)
            .map(Literal::argument)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} targets: {} valid, {} invalid",
            self.target_count(),
            self.valid.len(),
            self.invalid.len()
        )?;
        for target in &self.invalid {
            writeln!(f, "  invalid {target}")?;
        }
        Ok(())
    }
}
