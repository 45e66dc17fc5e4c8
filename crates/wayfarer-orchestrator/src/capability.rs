//! Stealth collaborator contract. The orchestrator core path never
//! requires a real implementation — `NoopStealth` is bound by default
//! and simply passes trajectories through unchanged.

use wayfarer_core::enums::StealthMode;
use wayfarer_core::types::{Trajectory, Waypoint};

/// Optional collaborator that refines a trajectory for stealth and scores
/// its signatures. `optimize` must be idempotent and side-effect-free and
/// return within the planner's deadline; the orchestrator discards its
/// output on error rather than propagating it.
pub trait StealthCapability: Send + Sync {
    fn optimize(&self, trajectory: &Trajectory, mode: StealthMode) -> Result<Trajectory, String>;
    fn calculate_rcs(&self, waypoint: &Waypoint, heading: f64) -> f64;
    fn calculate_thermal_signature(&self, waypoint: &Waypoint) -> f64;
}

/// Default binding: no stealth refinement, zero signatures.
#[derive(Debug, Default)]
pub struct NoopStealth;

impl StealthCapability for NoopStealth {
    fn optimize(&self, trajectory: &Trajectory, _mode: StealthMode) -> Result<Trajectory, String> {
        Ok(trajectory.clone())
    }

    fn calculate_rcs(&self, _waypoint: &Waypoint, _heading: f64) -> f64 {
        0.0
    }

    fn calculate_thermal_signature(&self, _waypoint: &Waypoint) -> f64 {
        0.0
    }
}
