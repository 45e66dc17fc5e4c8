//! Test double for `StealthCapability`, used only by this crate's own
//! tests (the orchestrator's production default is `NoopStealth`).

use wayfarer_core::enums::StealthMode;
use wayfarer_core::types::{Trajectory, Waypoint};

use crate::capability::StealthCapability;

/// Configurable pass/fail stub. On success it tags the trajectory's
/// confidence so tests can observe that `optimize` actually ran.
pub struct StubStealth {
    pub should_fail: bool,
}

impl StealthCapability for StubStealth {
    fn optimize(&self, trajectory: &Trajectory, _mode: StealthMode) -> Result<Trajectory, String> {
        if self.should_fail {
            return Err("stub stealth capability failed".to_string());
        }
        let mut optimized = trajectory.clone();
        optimized.stealth_score = (optimized.stealth_score + 0.1).min(1.0);
        Ok(optimized)
    }

    fn calculate_rcs(&self, _waypoint: &Waypoint, _heading: f64) -> f64 {
        0.1
    }

    fn calculate_thermal_signature(&self, _waypoint: &Waypoint) -> f64 {
        0.1
    }
}
