//! Property tests for saturation over random ground rule sets.

use proptest::prelude::*;
use shacl_rule_engine::{
    saturate, EvalState, Literal, NoopObserver, RuleBody, RuleMap, TargetSet, Verdict,
};
use std::collections::HashSet;
use std::sync::Arc;

const PREDICATES: [&str; 4] = ["P0", "P1", "P2", "P3"];
const ARGS: [&str; 3] = ["a", "b", "c"];

#[derive(Clone, Debug)]
struct RawRule {
    head: (usize, usize),
    body: Vec<(usize, usize, bool)>,
}

fn raw_rule_strategy() -> impl Strategy<Value = RawRule> {
    (
        (0..PREDICATES.len(), 0..ARGS.len()),
        prop::collection::vec((0..PREDICATES.len(), 0..ARGS.len(), any::<bool>()), 0..3),
    )
        .prop_map(|(head, body)| RawRule { head, body })
}

prop_compose! {
    fn scenario_strategy()
        (
            rules in prop::collection::vec(raw_rule_strategy(), 0..12),
            visited_first in prop::collection::vec(any::<bool>(), PREDICATES.len()),
            visited_later in prop::collection::vec(any::<bool>(), PREDICATES.len()),
            target_args in prop::collection::vec(any::<bool>(), ARGS.len()),
            polarity in polarity_strategy(),
        )
        -> (Vec<RawRule>, Vec<bool>, Vec<bool>, Vec<bool>, Vec<bool>)
    {
        (rules, visited_first, visited_later, target_args, polarity)
    }
}

/// Head polarity per ground atom, indexed `pred * ARGS.len() + arg`
///
/// One polarity per atom: a rule set deriving both `P(a)` and `!P(a)` is
/// contradictory input and fails loudly (see `test_contradictory_heads_fail_loudly`).
fn polarity_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), PREDICATES.len() * ARGS.len())
}

fn literal(pred: usize, arg: usize, positive: bool) -> Literal {
    Literal::new(PREDICATES[pred], ARGS[arg], positive)
}

fn head_of(rule: &RawRule, polarity: &[bool]) -> Literal {
    let (p, a) = rule.head;
    literal(p, a, polarity[p * ARGS.len() + a])
}

fn build_map(rules: &[RawRule], polarity: &[bool]) -> RuleMap {
    let mut map = RuleMap::new();
    for rule in rules {
        let body: RuleBody = rule
            .body
            .iter()
            .map(|&(p, a, pos)| literal(p, a, pos))
            .collect();
        map.add_rule(head_of(rule, polarity), body);
    }
    map
}

/// Targets are `P0(arg)` for the selected args
fn targets(target_args: &[bool]) -> Vec<Literal> {
    target_args
        .iter()
        .enumerate()
        .filter(|(_, &t)| t)
        .map(|(i, _)| literal(0, i, true))
        .collect()
}

fn visit(state: &mut EvalState, mask: &[bool]) {
    for (i, &v) in mask.iter().enumerate() {
        if v {
            state.visited_predicates.insert(Arc::from(PREDICATES[i]));
        }
    }
}

fn target_predicates() -> hashbrown::HashSet<Arc<str>> {
    [Arc::<str>::from("P0")].into_iter().collect()
}

fn assignment_of(state: &EvalState) -> HashSet<Literal> {
    state.assignment.iter().cloned().collect()
}

proptest! {
    #[test]
    fn prop_assignment_is_consistent((rules, visited, _, target_args, polarity) in scenario_strategy()) {
        let mut state = EvalState::new(TargetSet::new(targets(&target_args)));
        state.rule_map = build_map(&rules, &polarity);
        visit(&mut state, &visited);

        saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);

        for lit in state.assignment.iter() {
            prop_assert!(!state.assignment.contains(&lit.negation()), "both {} and its negation", lit);
        }
    }

    #[test]
    fn prop_derivations_are_supported((rules, visited, _, target_args, polarity) in scenario_strategy()) {
        let original = build_map(&rules, &polarity);
        let mut state = EvalState::new(TargetSet::new(targets(&target_args)));
        state.rule_map = original.clone();
        visit(&mut state, &visited);

        saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);

        for lit in state.assignment.iter() {
            if lit.is_positive() {
                // Some original rule for it has a body that is now fully decided true
                let bodies = original.bodies(lit);
                prop_assert!(bodies.is_some(), "{} derived without a rule", lit);
                prop_assert!(bodies
                    .into_iter()
                    .flatten()
                    .any(|b| state.assignment.contains_all(b)));
            } else {
                // Either a negative rule fired or negation-as-failure closed a
                // visited predicate
                let derived = original
                    .bodies(lit)
                    .into_iter()
                    .flatten()
                    .any(|b| state.assignment.contains_all(b));
                prop_assert!(
                    derived || state.is_visited(lit.predicate()),
                    "{} refuted while open",
                    lit
                );
            }
        }
    }

    #[test]
    fn prop_saturation_is_monotone(
        (rules, first, later, target_args, polarity) in scenario_strategy()
    ) {
        let mut state = EvalState::new(TargetSet::new(targets(&target_args)));
        state.rule_map = build_map(&rules, &polarity);
        visit(&mut state, &first);

        saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);
        let assigned = assignment_of(&state);
        let remaining: HashSet<Literal> = state.targets.remaining().iter().cloned().collect();
        let rules_before = state.rule_map.rule_count();

        visit(&mut state, &later);
        saturate(&mut state, &target_predicates(), 1, &mut NoopObserver);

        prop_assert!(assignment_of(&state).is_superset(&assigned));
        prop_assert!(state.targets.remaining().iter().all(|t| remaining.contains(t)));
        prop_assert!(state.rule_map.rule_count() <= rules_before);
    }

    #[test]
    fn prop_saturation_reaches_fixpoint((rules, visited, _, target_args, polarity) in scenario_strategy()) {
        let mut state = EvalState::new(TargetSet::new(targets(&target_args)));
        state.rule_map = build_map(&rules, &polarity);
        visit(&mut state, &visited);

        saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);
        let assigned = assignment_of(&state);
        let rules_after = state.rule_map.rule_count();

        let again = saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);
        prop_assert_eq!(again.rounds, 1);
        prop_assert_eq!(again.derived + again.refuted, 0);
        prop_assert_eq!(assignment_of(&state), assigned);
        prop_assert_eq!(state.rule_map.rule_count(), rules_after);
    }

    #[test]
    fn prop_closed_targets_are_decided((rules, _, _, target_args, polarity) in scenario_strategy()) {
        // Every predicate closed: a target stays remaining only while it heads
        // a pending rule (a positive cycle)
        let mut state = EvalState::new(TargetSet::new(targets(&target_args)));
        state.rule_map = build_map(&rules, &polarity);
        visit(&mut state, &[true; 4]);

        saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);

        for t in state.targets.remaining() {
            prop_assert!(state.rule_map.contains_head(t));
        }
        for t in targets(&target_args) {
            let verdict = state.targets.verdict(&t);
            if verdict == Verdict::Valid {
                prop_assert!(state.assignment.contains(&t));
            }
            if verdict == Verdict::Invalid {
                prop_assert!(state.assignment.contains(&t.negation()));
            }
        }
    }

    #[test]
    fn prop_grounding_is_idempotent(
        rules in prop::collection::vec(raw_rule_strategy(), 0..12),
        polarity in polarity_strategy(),
    ) {
        let once = build_map(&rules, &polarity);
        let mut twice = build_map(&rules, &polarity);
        for rule in &rules {
            let body: RuleBody = rule.body.iter().map(|&(p, a, pos)| literal(p, a, pos)).collect();
            prop_assert!(!twice.add_rule(head_of(rule, &polarity), body));
        }
        prop_assert_eq!(once.rule_count(), twice.rule_count());
        prop_assert_eq!(once.len(), twice.len());
    }
}

#[test]
#[should_panic(expected = "assignment would contain both")]
fn test_contradictory_heads_fail_loudly() {
    let mut state = EvalState::new(TargetSet::new([literal(0, 0, true)]));
    state.rule_map.add_rule(literal(1, 0, true), RuleBody::fact());
    state.rule_map.add_rule(literal(1, 0, false), RuleBody::fact());
    state.rule_map.add_rule(literal(0, 0, true), [literal(1, 0, true)].into_iter().collect());
    visit(&mut state, &[true; 4]);

    saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);
}

#[test]
fn test_negative_head_invalidates_target() {
    let target = literal(0, 1, true);
    let mut state = EvalState::new(TargetSet::new([target.clone()]));
    state.rule_map.add_rule(literal(0, 1, false), [literal(2, 1, true)].into_iter().collect());
    state.rule_map.add_rule(literal(2, 1, true), RuleBody::fact());

    // Nothing visited: only the rule can decide the target
    let stats = saturate(&mut state, &target_predicates(), 0, &mut NoopObserver);

    assert_eq!(state.targets.verdict(&target), Verdict::Invalid);
    assert_eq!(stats.newly_invalid, 1);
    assert!(state.assignment.contains(&target.negation()));
}
