//! Observability sink invoked by the validator
//!
//! Observers see wave boundaries, executed queries, saturation steps and
//! every resolved target. They cannot influence the run.

use std::sync::Arc;

use crate::diagnostics::{QueryStats, SaturationStats, WaveStats};
use crate::literal::Literal;
use crate::state::Verdict;

/// Callbacks for logs, statistics and result sinks. All default to no-ops.
pub trait ValidationObserver: Send {
    fn wave_started(&mut self, _depth: usize, _focus_shapes: &[Arc<str>]) {}

    fn query_evaluated(&mut self, _stats: &QueryStats) {}

    fn saturated(&mut self, _depth: usize, _stats: &SaturationStats) {}

    /// A target left `remaining`. `depth` is the wave it was resolved in.
    fn target_resolved(&mut self, _target: &Literal, _verdict: Verdict, _depth: usize) {}

    fn wave_finished(&mut self, _stats: &WaveStats) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ValidationObserver for NoopObserver {}

/// Observer that keeps resolved targets and query ids in arrival order
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub resolved: Vec<(Literal, Verdict, usize)>,
    pub queries: Vec<Arc<str>>,
    pub waves: Vec<(usize, Vec<Arc<str>>)>,
    pub saturations: usize,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Verdict and wave recorded for `target`, if resolved
    pub fn resolution_of(&self, target: &Literal) -> Option<(Verdict, usize)> {
        self.resolved
            .iter()
            .find(|(t, _, _)| t == target)
            .map(|(_, v, d)| (*v, *d))
    }
}

impl ValidationObserver for RecordingObserver {
    fn wave_started(&mut self, depth: usize, focus_shapes: &[Arc<str>]) {
        self.waves.push((depth, focus_shapes.to_vec()));
    }

    fn query_evaluated(&mut self, stats: &QueryStats) {
        self.queries.push(stats.query_id.clone());
    }

    fn saturated(&mut self, _depth: usize, _stats: &SaturationStats) {
        self.saturations += 1;
    }

    fn target_resolved(&mut self, target: &Literal, verdict: Verdict, depth: usize) {
        self.resolved.push((target.clone(), verdict, depth));
    }
}
