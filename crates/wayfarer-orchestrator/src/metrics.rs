//! Derived trajectory metrics the orchestrator computes itself (stealth
//! score, threat exposure, fuel, confidence), plus the `Trajectory`
//! constructor that ties them together. Kept separate from
//! `wayfarer-scoring` because these feed `Trajectory` fields directly,
//! upstream of scoring rather than part of it.

use wayfarer_core::enums::PayloadClass;
use wayfarer_core::profiles::PayloadProfile;
use wayfarer_core::threat::ThreatLocation;
use wayfarer_core::types::{Instant, Trajectory, TrajectoryId, Waypoint};

/// Confidence assigned before any physics-convergence or adaptation
/// adjustment (Open Question #3).
pub const BASELINE_CONFIDENCE: f64 = 0.8;
/// Multiplier applied when the physics optimizer converged on the
/// selected candidate, capped back to 1.0.
pub const CONVERGENCE_BOOST: f64 = 1.1;

/// Ratio of distance-to-threat over its effect radius; `< 1.0` means
/// inside the threat's influence, `+INFINITY` when there are no threats.
fn nearest_threat_ratio(position: wayfarer_core::types::Vector3, threats: &[ThreatLocation]) -> f64 {
    threats
        .iter()
        .map(|t| position.range_to(&t.position) / t.effect_radius.max(1.0))
        .fold(f64::INFINITY, f64::min)
}

/// Mean, over waypoints, of how deep inside the nearest threat's radius
/// that waypoint sits; 0 when clear of every threat or there are none.
pub fn compute_threat_exposure(waypoints: &[Waypoint], threats: &[ThreatLocation]) -> f64 {
    if waypoints.is_empty() || threats.is_empty() {
        return 0.0;
    }
    let sum: f64 = waypoints
        .iter()
        .map(|w| (1.0 - nearest_threat_ratio(w.position, threats).min(1.0)).max(0.0))
        .sum();
    (sum / waypoints.len() as f64).clamp(0.0, 1.0)
}

/// Multiplicative stealth score: the payload's base capability degraded
/// by every waypoint that falls inside a threat's effect radius. Long
/// trajectories through contested space legitimately approach zero.
pub fn compute_stealth_score(
    waypoints: &[Waypoint],
    profile: &PayloadProfile,
    threats: &[ThreatLocation],
) -> f64 {
    let mut score = profile.stealth_capability;
    for w in waypoints {
        let ratio = nearest_threat_ratio(w.position, threats);
        let factor = if ratio.is_finite() { ratio.min(1.0).max(0.0) } else { 1.0 };
        score *= factor;
    }
    score.clamp(0.0, 1.0)
}

/// Proportional fuel model: total distance scaled by the physics model's
/// consumption rate and the profile's efficiency.
pub fn compute_fuel_required(waypoints: &[Waypoint], profile: &PayloadProfile) -> f64 {
    let distance = Trajectory::compute_total_distance(waypoints);
    let efficiency = profile.fuel_efficiency.max(0.01);
    (distance * profile.physics.fuel_consumption_rate / efficiency).max(0.0)
}

/// Assemble a `Trajectory` from a finished waypoint list and its
/// payload's threat context. `confidence` starts at the baseline; the
/// caller adjusts it once physics convergence and adaptation outcomes
/// are known.
pub fn build_trajectory(
    id: TrajectoryId,
    waypoints: Vec<Waypoint>,
    payload_class: PayloadClass,
    threats: &[ThreatLocation],
    profile: &PayloadProfile,
    created_at: Instant,
) -> Trajectory {
    let total_distance = Trajectory::compute_total_distance(&waypoints);
    let estimated_time = Trajectory::compute_estimated_time(&waypoints);
    let stealth_score = compute_stealth_score(&waypoints, profile, threats);
    let threat_exposure = compute_threat_exposure(&waypoints, threats);
    let fuel_required = compute_fuel_required(&waypoints, profile);
    Trajectory {
        id,
        payload_class,
        waypoints,
        total_distance,
        estimated_time,
        stealth_score,
        threat_exposure,
        fuel_required,
        confidence: BASELINE_CONFIDENCE,
        created_at,
    }
}

/// Compose the final confidence: `base` (the pipeline baseline, or the
/// consensus weight for a consensus-derived candidate), boosted if the
/// physics optimizer converged, scaled by the adaptation confidence
/// multiplier (1.0 if no adaptation ran, 0.9 if it touched any waypoint).
pub fn compose_confidence(base: f64, physics_converged: bool, adaptation_confidence: f64) -> f64 {
    let boosted = if physics_converged {
        (base * CONVERGENCE_BOOST).min(1.0)
    } else {
        base
    };
    (boosted * adaptation_confidence).clamp(0.0, 1.0)
}
