//! Fixed numerical constants used by the planning pipeline.
//!
//! Tunables a caller might reasonably want to override (candidate counts,
//! rollout step cap, learning rate, ...) live in `PlannerConfig` (see
//! `config.rs`) instead of here — these are the values pinned exactly
//! rather than left as an operator-adjustable default.

/// Target arrival radius: a rollout stops once within this of the target (m).
pub const TAU_TARGET: f64 = 100.0;

/// Integration step for agent rollouts: a 1-second Euler step (seconds).
pub const ROLLOUT_DT: f64 = 1.0;

/// Position-normalization scale used when encoding state vectors (meters).
pub const STATE_POSITION_SCALE: f64 = 1e5;

/// Velocity-normalization scale used when encoding state vectors (m/s).
pub const STATE_VELOCITY_SCALE: f64 = 1e3;

/// Gaussian exploration noise standard deviation applied to raw policy outputs.
pub const EXPLORATION_NOISE_STD: f64 = 0.1;

/// Small-velocity clamp preventing heading computation from exploding near zero speed (m/s).
pub const MIN_SPEED_CLAMP: f64 = 0.1;

/// Fallback minimum speed used when a profile declares `min_speed == 0`.
pub const DEFAULT_MIN_SPEED_FLOOR: f64 = 1.0;

/// Deviation from the nearest waypoint that triggers a replan in `update` (m).
pub const DEVIATION_REPLAN_THRESHOLD: f64 = 100.0;

/// Endpoint speed tolerance multiplier used by validation.
pub const SPEED_TOLERANCE_FACTOR: f64 = 1.1;

/// Deterministic threat-id cell size used to derive `threat-<ix>-<iy>-<iz>` ids.
pub const THREAT_ID_CELL_METERS: f64 = 1.0;

/// Bounded experience buffer capacity (on the order of 10^5 entries).
pub const EXPERIENCE_BUFFER_CAPACITY: usize = 100_000;

/// Opaque build-time model version tag returned by `model_version()`.
pub const MODEL_VERSION: &str = "wayfarer-planner-1.0";
