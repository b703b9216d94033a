//! Shared helpers for shacl-rule-engine integration tests.
//!
//! Shapes are built by hand, shaped like compiled ones: one
//! conjunction per disjunct with predicates `{shape}_c{i}`,
//! `{shape}_c{i}_pos` and `{shape}_c{i}_max_{j}`.

#![allow(dead_code)]

pub mod span_capture;

use shacl_rule_engine::{
    Binding, Conjunction, LiteralTemplate, Query, RulePattern, Shape, ValidationObserver,
    QueryStats,
};

/// One conjunction of a hand-built shape
#[derive(Default, Clone)]
pub struct Disjunct {
    /// Shapes referenced by the min query, each through its own variable
    pub refs: Vec<&'static str>,
    /// Number of max (violation) queries
    pub max_queries: usize,
}

impl Disjunct {
    pub fn refs(refs: &[&'static str]) -> Self {
        Self {
            refs: refs.to_vec(),
            max_queries: 0,
        }
    }

    pub fn with_max(mut self, n: usize) -> Self {
        self.max_queries = n;
        self
    }
}

pub fn target_query_id(shape: &str) -> String {
    format!("{shape}_target")
}

pub fn min_query_id(shape: &str, disjunct: usize) -> String {
    format!("{shape}_c{disjunct}_min")
}

pub fn max_query_id(shape: &str, disjunct: usize, i: usize) -> String {
    format!("{shape}_c{disjunct}_max_{i}")
}

/// Build a shape with the given disjuncts; disjuncts are numbered from 1
pub fn shape(id: &str, targeted: bool, disjuncts: &[Disjunct]) -> Shape {
    let mut shape = Shape::new(id);
    if targeted {
        shape = shape.with_target_query(Query::new(
            target_query_id(id),
            RulePattern::new(LiteralTemplate::positive(id, "x"), vec![]),
            format!("SELECT ?x WHERE {{ ?x a <{id}> }}"),
        ));
    }

    for (n, d) in disjuncts.iter().enumerate() {
        let n = n + 1;
        let c = format!("{id}_c{n}");
        let pos = format!("{c}_pos");

        let min_body = d
            .refs
            .iter()
            .enumerate()
            .map(|(i, r)| LiteralTemplate::positive(*r, format!("v{i}")))
            .collect();
        let min_query = Query::new(
            min_query_id(id, n),
            RulePattern::new(LiteralTemplate::positive(pos.as_str(), "x"), min_body),
            "",
        );

        let mut conj_body = vec![LiteralTemplate::positive(pos.as_str(), "x")];
        let mut max_queries = Vec::new();
        for i in 1..=d.max_queries {
            let max = format!("{c}_max_{i}");
            max_queries.push(Query::new(
                max_query_id(id, n, i),
                RulePattern::new(LiteralTemplate::positive(max.as_str(), "x"), vec![]),
                "",
            ));
            conj_body.push(LiteralTemplate::negative(max.as_str(), "x"));
            shape = shape.with_predicate(max);
        }

        shape = shape
            .with_predicate(c.as_str())
            .with_predicate(pos)
            .with_conjunction(Conjunction {
                id: c.as_str().into(),
                min_query,
                max_queries,
            })
            .with_rule_pattern(RulePattern::new(
                LiteralTemplate::positive(c.as_str(), "x"),
                conj_body,
            ))
            .with_rule_pattern(RulePattern::new(
                LiteralTemplate::positive(id, "x"),
                vec![LiteralTemplate::positive(c.as_str(), "x")],
            ));
    }
    shape
}

/// Solution binding `x` only
pub fn focus(node: &str) -> Binding {
    Binding::new().with("x", node)
}

/// Solution binding `x` plus `v0..` for referenced nodes
pub fn focus_with_refs(node: &str, refs: &[&str]) -> Binding {
    refs.iter()
        .enumerate()
        .fold(focus(node), |b, (i, r)| b.with(format!("v{i}"), *r))
}

/// Observer keeping every query's statistics
#[derive(Default)]
pub struct StatsObserver {
    pub queries: Vec<QueryStats>,
}

impl StatsObserver {
    pub fn stats_for(&self, query_id: &str) -> Option<&QueryStats> {
        self.queries.iter().find(|q| q.query_id.as_ref() == query_id)
    }
}

impl ValidationObserver for StatsObserver {
    fn query_evaluated(&mut self, stats: &QueryStats) {
        self.queries.push(stats.clone());
    }
}
