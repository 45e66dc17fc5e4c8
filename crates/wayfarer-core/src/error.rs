//! Planner-wide error type.
//!
//! A flat `thiserror` enum at the crate boundary, one variant per failure
//! the caller can actually branch on, each message naming the offending
//! identifier rather than a generic "failed" string.

use thiserror::Error;

use crate::enums::PayloadClass;
use crate::types::TrajectoryId;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("payload class {class:?} has no registered profile")]
    UnsupportedPayload { class: PayloadClass },

    #[error("trajectory candidate {index} is invalid: {reason}")]
    InvalidTrajectory { index: usize, reason: String },

    #[error("no trajectory is available ({0:?})")]
    PlanUnavailable(Option<TrajectoryId>),

    #[error("optimization did not converge: {0}")]
    OptimizationFailed(String),

    #[error("planning for payload class {class:?} timed out after {elapsed_secs:.3}s")]
    Timeout {
        class: PayloadClass,
        elapsed_secs: f64,
    },

    #[error("no feasible route exists from the requested origin to the requested target")]
    NoRoute,
}
