//! Saturation: rule application plus negation-as-failure, to a local fixpoint.
//!
//! Each round runs two passes in a fixed order:
//!
//! 1. **Negation-as-failure.** A pending literal whose predicate is visited,
//!    whose positive atom is not a pending head and is not yet decided, can
//!    never be derived: its negated atom is asserted. Remaining targets are
//!    tested the same way and become invalid when refuted.
//! 2. **Rule application.** A head with a body fully contained in the
//!    assignment is derived. Otherwise only its live bodies are retained (a
//!    body is dead once the negation of one of its literals is decided). A
//!    head left without live bodies is dropped underived, so that a later
//!    negation-as-failure pass can refute it.
//!
//! Rounds repeat until neither pass changes the assignment or the rule map.
//! The assignment only grows and the rule map only shrinks, so this
//! terminates.

use hashbrown::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::assignment::Assignment;
use crate::diagnostics::SaturationStats;
use crate::literal::Literal;
use crate::observer::ValidationObserver;
use crate::rule_map::{RuleBody, RuleMap};
use crate::state::{EvalState, Verdict};

/// Saturate `state` to a local fixpoint
///
/// `target_predicates` are the predicates of shapes with a target query;
/// derivations under them resolve targets.
pub fn saturate(
    state: &mut EvalState,
    target_predicates: &HashSet<Arc<str>>,
    depth: usize,
    observer: &mut dyn ValidationObserver,
) -> SaturationStats {
    Saturator::new(target_predicates, depth).saturate(state, observer)
}

/// Saturates one [`EvalState`] after a wave has been grounded
pub struct Saturator<'a> {
    /// Predicates naming shapes that declare a target query
    target_predicates: &'a HashSet<Arc<str>>,
    /// Current wave, reported with resolved targets
    depth: usize,
}

impl<'a> Saturator<'a> {
    pub fn new(target_predicates: &'a HashSet<Arc<str>>, depth: usize) -> Self {
        Self {
            target_predicates,
            depth,
        }
    }

    /// Run rounds until nothing changes
    pub fn saturate(
        &self,
        state: &mut EvalState,
        observer: &mut dyn ValidationObserver,
    ) -> SaturationStats {
        let span = tracing::debug_span!(
            "saturate",
            depth = self.depth,
            rounds = tracing::field::Empty,
            derived = tracing::field::Empty,
            refuted = tracing::field::Empty,
        );
        let _guard = span.enter();

        let start = Instant::now();
        let mut stats = SaturationStats::default();

        loop {
            stats.rounds += 1;
            let rules_before = state.rule_map.rule_count();
            let refuted = self.negate_unmatchable(state, observer, &mut stats);
            let derived = self.apply_rules(state, observer, &mut stats);
            let rules_after = state.rule_map.rule_count();

            tracing::trace!(
                round = stats.rounds,
                refuted,
                derived,
                rules = rules_after,
                assignment = state.assignment.len(),
                "saturation round"
            );

            if refuted == 0 && derived == 0 && rules_after == rules_before {
                break;
            }
        }

        stats.duration = start.elapsed();
        span.record("rounds", stats.rounds);
        span.record("derived", stats.derived);
        span.record("refuted", stats.refuted);
        stats
    }

    /// Negation-as-failure pass. Returns the number of new negations.
    pub fn negate_unmatchable(
        &self,
        state: &mut EvalState,
        observer: &mut dyn ValidationObserver,
        stats: &mut SaturationStats,
    ) -> usize {
        let refutations: HashSet<Literal> = state
            .rule_map
            .body_literals()
            .filter(|lit| is_unmatchable(state, lit))
            .map(|lit| lit.atom().negation())
            .collect();

        let invalid_targets: Vec<Literal> = state
            .targets
            .remaining()
            .iter()
            .filter(|t| state.assignment.contains(&t.negation()) || is_unmatchable(state, t))
            .cloned()
            .collect();

        let mut asserted = 0;
        for neg in refutations {
            if state.assignment.insert(neg) {
                asserted += 1;
            }
        }
        for target in invalid_targets {
            if state.assignment.insert(target.negation()) {
                asserted += 1;
            }
            if state.targets.resolve(&target, Verdict::Invalid) {
                stats.newly_invalid += 1;
                observer.target_resolved(&target, Verdict::Invalid, self.depth);
            }
        }

        stats.refuted += asserted;
        asserted
    }

    /// Rule application pass. Returns the number of derived heads.
    pub fn apply_rules(
        &self,
        state: &mut EvalState,
        observer: &mut dyn ValidationObserver,
        stats: &mut SaturationStats,
    ) -> usize {
        // Compact into a fresh map; the old one is consumed here.
        let pending = state.rule_map.replace(RuleMap::new());
        let mut fresh: Vec<Literal> = Vec::new();

        for (head, bodies) in pending {
            if state.assignment.is_decided(&head) {
                continue;
            }
            match evaluate_bodies(&state.assignment, bodies) {
                BodyOutcome::Satisfied => fresh.push(head),
                BodyOutcome::Pending(live) => state.rule_map.add_rules(head, live),
                BodyOutcome::Dead => {}
            }
        }

        let derived = fresh.len();
        for head in fresh {
            state.assignment.insert(head.clone());
            if !self.target_predicates.contains(head.predicate()) {
                continue;
            }
            let verdict = if head.is_positive() {
                Verdict::Valid
            } else {
                Verdict::Invalid
            };
            if state.targets.resolve(&head.atom(), verdict) {
                match verdict {
                    Verdict::Valid => stats.newly_valid += 1,
                    _ => stats.newly_invalid += 1,
                }
                observer.target_resolved(&head.atom(), verdict, self.depth);
            }
        }

        stats.derived += derived;
        derived
    }
}

enum BodyOutcome {
    Satisfied,
    Pending(Vec<RuleBody>),
    Dead,
}

fn evaluate_bodies<I>(assignment: &Assignment, bodies: I) -> BodyOutcome
where
    I: IntoIterator<Item = RuleBody>,
{
    let mut live = Vec::new();
    for body in bodies {
        if assignment.contains_all(&body) {
            return BodyOutcome::Satisfied;
        }
        if !is_dead(assignment, &body) {
            live.push(body);
        }
    }
    if live.is_empty() {
        BodyOutcome::Dead
    } else {
        BodyOutcome::Pending(live)
    }
}

/// A body is dead once the negation of any of its literals is decided
pub fn is_dead(assignment: &Assignment, body: &RuleBody) -> bool {
    body.iter().any(|lit| assignment.contains(&lit.negation()))
}

/// Closed-world test: `lit` can no longer be derived
///
/// Its predicate has been visited (every query that could produce it has
/// run), its positive atom is not a pending head, and that atom is still
/// undecided.
pub fn is_unmatchable(state: &EvalState, lit: &Literal) -> bool {
    let atom = lit.atom();
    state.is_visited(atom.predicate())
        && !state.rule_map.contains_head(&atom)
        && !state.assignment.is_decided(&atom)
}
