//! Tunable knobs for the planning pipeline, separate from the fixed values
//! in `constants.rs`. Grouped into one struct so an orchestrator can be
//! constructed with a single override point rather than a long argument
//! list.

use serde::{Deserialize, Serialize};

/// Construction-time configuration for the planning pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Number of MARL-agent candidates generated per `plan` call.
    pub k_marl: usize,
    /// Number of rule-based candidates generated per `plan` call.
    pub k_rule: usize,
    /// Maximum integration steps a single rollout may take before it is
    /// abandoned as non-convergent.
    pub max_rollout_steps: usize,
    /// Learning rate applied when folding reward into exploration rate.
    pub learning_rate: f64,
    /// Maximum physics-residual optimization rounds per candidate.
    pub max_optimizer_rounds: usize,
    /// Residual magnitude below which a candidate is considered converged.
    pub convergence_tolerance: f64,
    /// Distance from the nearest planned waypoint that triggers a replan.
    pub deviation_threshold: f64,
    /// Weight given to consensus agreement across specialized agents when
    /// folding the consensus trajectory into the candidate set.
    pub consensus_weight: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            k_marl: 7,
            k_rule: 3,
            max_rollout_steps: 50,
            learning_rate: 0.01,
            max_optimizer_rounds: 10,
            convergence_tolerance: 1e-2,
            deviation_threshold: crate::constants::DEVIATION_REPLAN_THRESHOLD,
            consensus_weight: 0.3,
        }
    }
}
