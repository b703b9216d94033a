//! Statistics collected during a validation run
//!
//! Purely observational: nothing here feeds back into control flow.

use std::sync::Arc;
use std::time::Duration;

/// One executed query
#[derive(Clone, Debug)]
pub struct QueryStats {
    pub query_id: Arc<str>,
    /// Shape whose wave issued the query
    pub shape_id: Arc<str>,
    /// Solution mappings returned by the endpoint
    pub solution_mappings: usize,
    /// New `(head, body)` pairs added to the rule map
    pub rules_grounded: usize,
    /// Pattern instantiations skipped for missing variables
    pub coverage_misses: usize,
    /// Time spent in the endpoint
    pub duration: Duration,
}

/// One saturation to a local fixpoint
#[derive(Clone, Debug, Default)]
pub struct SaturationStats {
    /// Rounds executed, including the final one that changed nothing
    pub rounds: usize,
    /// Heads derived by rule application
    pub derived: usize,
    /// Negations asserted by negation-as-failure
    pub refuted: usize,
    pub newly_valid: usize,
    pub newly_invalid: usize,
    pub duration: Duration,
}

/// One wave of focus shapes
#[derive(Clone, Debug, Default)]
pub struct WaveStats {
    pub depth: usize,
    pub focus_shapes: Vec<Arc<str>>,
    pub queries: usize,
    pub solution_mappings: usize,
    /// Rules retained right after grounding, before saturation
    pub rules_after_grounding: usize,
    /// Rules retained once saturated
    pub rules_after_saturation: usize,
    pub saturation: SaturationStats,
    pub remaining: usize,
    pub valid: usize,
    pub invalid: usize,
    pub duration: Duration,
}

/// Diagnostics for a whole run, returned with every report
#[derive(Clone, Debug, Default)]
pub struct ValidationDiagnostics {
    pub waves: Vec<WaveStats>,
    /// Targets extracted from the target queries
    pub target_count: usize,
    /// Queries executed, target queries included
    pub queries_run: usize,
    pub solution_mappings: usize,
    /// Largest number of rules held in memory at any wave boundary
    pub max_rule_count: usize,
    /// Targets that were never refuted and got completed as valid
    pub completed_as_valid: usize,
    pub duration: Duration,
}

impl ValidationDiagnostics {
    pub(crate) fn record_rule_count(&mut self, count: usize) {
        self.max_rule_count = self.max_rule_count.max(count);
    }

    pub(crate) fn record_query(&mut self, solution_mappings: usize) {
        self.queries_run += 1;
        self.solution_mappings += solution_mappings;
    }

    pub(crate) fn record_wave(&mut self, wave: WaveStats) {
        self.record_rule_count(wave.rules_after_grounding);
        self.record_rule_count(wave.rules_after_saturation);
        self.waves.push(wave);
    }

    /// Number of waves executed
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }
}
