//! Mutable state owned by a single validation run

use hashbrown::HashSet;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::assignment::Assignment;
use crate::literal::Literal;
use crate::rule_map::RuleMap;

/// Outcome for one target literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Valid,
    Invalid,
    Undetermined,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Valid => "valid",
            Verdict::Invalid => "invalid",
            Verdict::Undetermined => "undetermined",
        })
    }
}

/// Targets partitioned into remaining, valid and invalid
///
/// A target moves out of `remaining` at most once.
#[derive(Debug, Clone, Default)]
pub struct TargetSet {
    remaining: HashSet<Literal>,
    valid: BTreeSet<Literal>,
    invalid: BTreeSet<Literal>,
}

impl TargetSet {
    pub fn new<I: IntoIterator<Item = Literal>>(targets: I) -> Self {
        Self {
            remaining: targets.into_iter().collect(),
            valid: BTreeSet::new(),
            invalid: BTreeSet::new(),
        }
    }

    /// Move `target` from remaining to the partition for `verdict`.
    ///
    /// Returns false if it was not remaining.
    pub fn resolve(&mut self, target: &Literal, verdict: Verdict) -> bool {
        let partition = match verdict {
            Verdict::Valid => &mut self.valid,
            Verdict::Invalid => &mut self.invalid,
            Verdict::Undetermined => return false,
        };
        if !self.remaining.remove(target) {
            return false;
        }
        partition.insert(target.clone());
        true
    }

    /// Resolve every remaining target as valid, returning them
    pub fn complete_as_valid(&mut self) -> Vec<Literal> {
        let mut completed: Vec<Literal> = self.remaining.drain().collect();
        completed.sort();
        self.valid.extend(completed.iter().cloned());
        completed
    }

    pub fn verdict(&self, target: &Literal) -> Verdict {
        if self.valid.contains(target) {
            Verdict::Valid
        } else if self.invalid.contains(target) {
            Verdict::Invalid
        } else {
            Verdict::Undetermined
        }
    }

    pub fn remaining(&self) -> &HashSet<Literal> {
        &self.remaining
    }

    pub fn valid(&self) -> &BTreeSet<Literal> {
        &self.valid
    }

    pub fn invalid(&self) -> &BTreeSet<Literal> {
        &self.invalid
    }

    pub fn is_done(&self) -> bool {
        self.remaining.is_empty()
    }

    pub(crate) fn into_partitions(self) -> (BTreeSet<Literal>, BTreeSet<Literal>) {
        (self.valid, self.invalid)
    }
}

/// Everything one scheduler run mutates
#[derive(Debug, Default)]
pub struct EvalState {
    pub rule_map: RuleMap,
    pub assignment: Assignment,
    /// Predicates whose queries have all been executed and grounded
    pub visited_predicates: HashSet<Arc<str>>,
    /// Shapes that have been evaluated
    pub visited_shapes: HashSet<Arc<str>>,
    pub targets: TargetSet,
}

impl EvalState {
    pub fn new(targets: TargetSet) -> Self {
        Self {
            targets,
            ..Default::default()
        }
    }

    pub fn is_visited(&self, predicate: &str) -> bool {
        self.visited_predicates.contains(predicate)
    }
}
