//! Inbound request and update records.

use serde::{Deserialize, Serialize};

use crate::enums::{PayloadClass, Priority, StealthMode};
use crate::threat::ThreatLocation;
use crate::types::{TrajectoryId, Vector3};

/// Constraints accompanying a plan request: threats to avoid and whether
/// stealth is mandatory for the produced trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanConstraints {
    pub threats: Vec<ThreatLocation>,
    pub stealth_required: bool,
}

/// A request to produce a new trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub start: Vector3,
    pub target: Vector3,
    pub payload_class: PayloadClass,
    pub max_time: f64,
    pub priority: Priority,
    pub stealth_mode: StealthMode,
    pub constraints: PlanConstraints,
}

impl PlanRequest {
    /// `true` once `max_time` has elapsed since `started_at`.
    pub fn is_overdue(&self, elapsed_secs: f64) -> bool {
        elapsed_secs >= self.max_time
    }
}

/// Current vehicle state submitted to `update`, referencing a previously
/// returned trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub current_position: Vector3,
    pub trajectory_id: TrajectoryId,
}
