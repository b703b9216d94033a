//! Wave scheduler
//!
//! Evaluation proceeds in waves. Wave 0 queries every shape that declares a
//! target; each later wave queries the unvisited shapes that own a predicate
//! still pending in some rule body. Within a wave the scheduler:
//!
//! 1. runs the min and max queries of every focus shape and grounds each
//!    solution against the query's own pattern and the shape's patterns,
//! 2. marks the predicates of every focus shape as visited,
//! 3. saturates to a local fixpoint.
//!
//! Each shape is queried at most once, so a schema of `N` shapes needs at most
//! `N` waves. The run ends as soon as no target is left undetermined. If no
//! focus shape remains while targets are still undetermined, nothing can
//! refute them any more and they are completed as valid.

use futures::stream::{self, StreamExt, TryStreamExt};
use hashbrown::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::binding::Binding;
use crate::diagnostics::{QueryStats, ValidationDiagnostics, WaveStats};
use crate::endpoint::QueryExecutor;
use crate::error::{Result, ValidationError};
use crate::literal::Literal;
use crate::observer::{NoopObserver, ValidationObserver};
use crate::options::ValidationOptions;
use crate::report::ValidationReport;
use crate::saturate::Saturator;
use crate::schema::{Query, Schema, Shape};
use crate::state::{EvalState, TargetSet, Verdict};

/// Validates a [`Schema`] against one query endpoint
#[derive(Debug)]
pub struct Validator<E> {
    schema: Schema,
    endpoint: E,
    options: ValidationOptions,
}

/// Result of one executed query, before grounding
struct QueryOutcome<'a> {
    shape: &'a Shape,
    query: &'a Query,
    rows: Vec<Binding>,
    elapsed: Duration,
}

impl<E: QueryExecutor> Validator<E> {
    pub fn new(schema: Schema, endpoint: E) -> Self {
        Self {
            schema,
            endpoint,
            options: ValidationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate every target of the schema
    pub async fn validate(&self) -> Result<ValidationReport> {
        self.validate_with_observer(&mut NoopObserver).await
    }

    /// Validate, reporting progress to `observer`
    ///
    /// Fails on the first endpoint error; no partial report is produced.
    pub async fn validate_with_observer(
        &self,
        observer: &mut dyn ValidationObserver,
    ) -> Result<ValidationReport> {
        self.options.validate()?;

        let span = tracing::info_span!(
            "validate",
            shapes = self.schema.len(),
            targets = tracing::field::Empty,
            waves = tracing::field::Empty,
        );
        // Async block + .instrument() so no span guard is held across .await
        async {
            let span = tracing::Span::current();
            let start = Instant::now();
            let mut diagnostics = ValidationDiagnostics::default();

            let targets = self.extract_targets(&mut diagnostics, observer).await?;
            span.record("targets", targets.len());
            diagnostics.target_count = targets.len();

            let target_predicates: HashSet<Arc<str>> =
                self.schema.target_shapes().map(|s| s.id.clone()).collect();
            let mut state = EvalState::new(TargetSet::new(targets));
            let mut focus: Vec<Arc<str>> =
                self.schema.target_shapes().map(|s| s.id.clone()).collect();
            let mut depth = 0;

            while !state.targets.is_done() && !focus.is_empty() {
                let wave = self
                    .run_wave(&mut state, &focus, depth, &target_predicates, observer, &mut diagnostics)
                    .instrument(tracing::debug_span!("wave", depth, shapes = focus.len()))
                    .await?;
                observer.wave_finished(&wave);
                diagnostics.record_wave(wave);

                focus = self.next_focus(&state);
                depth += 1;
            }

            if !state.targets.is_done() {
                let completed = state.targets.complete_as_valid();
                tracing::debug!(
                    count = completed.len(),
                    "no shape left to query; completing remaining targets as valid"
                );
                let last_depth = depth.saturating_sub(1);
                for target in &completed {
                    observer.target_resolved(target, Verdict::Valid, last_depth);
                }
                diagnostics.completed_as_valid = completed.len();
            }

            span.record("waves", depth);
            diagnostics.duration = start.elapsed();

            let (valid, invalid) = state.targets.into_partitions();
            tracing::info!(
                valid = valid.len(),
                invalid = invalid.len(),
                queries = diagnostics.queries_run,
                max_rules = diagnostics.max_rule_count,
                "validation complete"
            );
            Ok::<_, ValidationError>(ValidationReport::new(valid, invalid, diagnostics))
        }
        .instrument(span)
        .await
    }

    /// Run every target query and collect one positive literal per target node
    async fn extract_targets(
        &self,
        diagnostics: &mut ValidationDiagnostics,
        observer: &mut dyn ValidationObserver,
    ) -> Result<Vec<Literal>> {
        let jobs: Vec<(&Shape, &Query)> = self
            .schema
            .target_shapes()
            .filter_map(|s| s.target_query.as_ref().map(|q| (s, q)))
            .collect();

        let var = self.options.target_variable.as_ref();
        let mut targets = Vec::new();
        let mut seen = HashSet::new();
        let mut outcomes = std::pin::pin!(self.dispatch(&jobs));
        while let Some(outcome) = outcomes.try_next().await? {
            let mut misses = 0;
            for row in &outcome.rows {
                match row.get(var) {
                    Some(node) => {
                        let target = Literal::positive(outcome.shape.id.clone(), node.clone());
                        if seen.insert(target.clone()) {
                            targets.push(target);
                        }
                    }
                    None => misses += 1,
                }
            }
            diagnostics.record_query(outcome.rows.len());
            observer.query_evaluated(&QueryStats {
                query_id: outcome.query.id.clone(),
                shape_id: outcome.shape.id.clone(),
                solution_mappings: outcome.rows.len(),
                rules_grounded: 0,
                coverage_misses: misses,
                duration: outcome.elapsed,
            });
        }
        Ok(targets)
    }

    async fn run_wave(
        &self,
        state: &mut EvalState,
        focus: &[Arc<str>],
        depth: usize,
        target_predicates: &HashSet<Arc<str>>,
        observer: &mut dyn ValidationObserver,
        diagnostics: &mut ValidationDiagnostics,
    ) -> Result<WaveStats> {
        let start = Instant::now();
        observer.wave_started(depth, focus);

        let shapes: Vec<&Shape> = focus.iter().filter_map(|id| self.schema.shape(id)).collect();
        let jobs: Vec<(&Shape, &Query)> = shapes
            .iter()
            .flat_map(|&shape| shape.queries().map(move |q| (shape, q)))
            .collect();

        let mut wave = WaveStats {
            depth,
            focus_shapes: focus.to_vec(),
            ..Default::default()
        };

        // Results arrive in job order; grounding stays on this task.
        let mut outcomes = std::pin::pin!(self.dispatch(&jobs));
        while let Some(outcome) = outcomes.try_next().await? {
            let stats = ground(state, &outcome);
            wave.queries += 1;
            wave.solution_mappings += stats.solution_mappings;
            diagnostics.record_query(stats.solution_mappings);
            observer.query_evaluated(&stats);
        }
        wave.rules_after_grounding = state.rule_map.rule_count();

        for shape in &shapes {
            state.visited_shapes.insert(shape.id.clone());
            state
                .visited_predicates
                .extend(shape.predicates.iter().cloned());
        }

        wave.saturation = Saturator::new(target_predicates, depth).saturate(state, observer);
        observer.saturated(depth, &wave.saturation);

        wave.rules_after_saturation = state.rule_map.rule_count();
        wave.remaining = state.targets.remaining().len();
        wave.valid = state.targets.valid().len();
        wave.invalid = state.targets.invalid().len();
        wave.duration = start.elapsed();

        tracing::debug!(
            queries = wave.queries,
            rows = wave.solution_mappings,
            rules = wave.rules_after_saturation,
            remaining = wave.remaining,
            valid = wave.valid,
            invalid = wave.invalid,
            "wave saturated"
        );
        Ok(wave)
    }

    /// Unvisited shapes owning a predicate of some pending body literal,
    /// in schema order
    fn next_focus(&self, state: &EvalState) -> Vec<Arc<str>> {
        let pending: HashSet<&Arc<str>> = state
            .rule_map
            .body_literals()
            .filter_map(|lit| self.schema.owner_of(lit.predicate()))
            .map(|shape| &shape.id)
            .filter(|id| !state.visited_shapes.contains(*id))
            .collect();

        self.schema
            .shapes()
            .iter()
            .filter(|s| pending.contains(&s.id))
            .map(|s| s.id.clone())
            .collect()
    }

    /// Execute `jobs` with bounded concurrency, yielding outcomes in job order
    fn dispatch<'a>(
        &'a self,
        jobs: &'a [(&'a Shape, &'a Query)],
    ) -> impl futures::Stream<Item = Result<QueryOutcome<'a>>> + 'a {
        stream::iter(jobs.iter().map(move |&(shape, query)| self.execute(shape, query)))
            .buffered(self.options.max_concurrent_queries)
    }

    async fn execute<'a>(&'a self, shape: &'a Shape, query: &'a Query) -> Result<QueryOutcome<'a>> {
        let span = tracing::debug_span!(
            "query",
            id = %query.id,
            shape = %shape.id,
            rows = tracing::field::Empty,
        );
        async {
            let start = Instant::now();
            let rows = self.endpoint.run_query(&query.id, &query.sparql).await?;
            tracing::Span::current().record("rows", rows.len());
            Ok::<_, ValidationError>(QueryOutcome {
                shape,
                query,
                rows,
                elapsed: start.elapsed(),
            })
        }
        .instrument(span)
        .await
    }
}

/// Ground every solution against the query pattern and the shape's patterns
fn ground(state: &mut EvalState, outcome: &QueryOutcome<'_>) -> QueryStats {
    let mut rules_grounded = 0;
    let mut coverage_misses = 0;
    let patterns = std::iter::once(&outcome.query.pattern).chain(outcome.shape.rule_patterns.iter());

    for row in &outcome.rows {
        for pattern in patterns.clone() {
            match pattern.instantiate(row) {
                Some((head, body)) => {
                    if state.rule_map.add_rule(head, body) {
                        rules_grounded += 1;
                    }
                }
                None => coverage_misses += 1,
            }
        }
    }

    tracing::trace!(
        query = %outcome.query.id,
        rows = outcome.rows.len(),
        rules_grounded,
        coverage_misses,
        "grounded"
    );
    QueryStats {
        query_id: outcome.query.id.clone(),
        shape_id: outcome.shape.id.clone(),
        solution_mappings: outcome.rows.len(),
        rules_grounded,
        coverage_misses,
        duration: outcome.elapsed,
    }
}
