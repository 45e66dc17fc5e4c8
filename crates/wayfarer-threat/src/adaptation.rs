//! Threat adaptation and ballistic prediction. Pure functions over plain
//! data — no shared state, no hidden control flow.

use tracing::{debug, warn};

use wayfarer_core::enums::EvasionManeuver;
use wayfarer_core::error::PlannerError;
use wayfarer_core::threat::EvasionStrategyTable;
use wayfarer_core::types::{Vector3, Waypoint};

pub use crate::profiles::evaluate_alert_level as evaluate;

/// Registered threats close enough to matter for a given trajectory:
/// within `1.5 * effect_radius` of at least one of its waypoints.
fn threats_in_range<'a>(
    waypoints: &[Waypoint],
    threats: &'a [wayfarer_core::threat::ThreatLocation],
) -> Vec<&'a wayfarer_core::threat::ThreatLocation> {
    threats
        .iter()
        .filter(|t| {
            waypoints
                .iter()
                .any(|w| w.position.range_to(&t.position) < 1.5 * t.effect_radius)
        })
        .collect()
}

/// Apply evasion maneuvers to interior waypoints that fall inside an
/// in-range threat's effect radius. Returns the mutated waypoints and the
/// confidence multiplier (0.9, applied only if any adaptation occurred).
///
/// Fails with `PlannerError::NoRoute` if, after every maneuver has been
/// applied, some interior waypoint still sits inside an in-range threat's
/// effect radius — evasion was attempted but didn't clear the threat.
pub fn adapt(
    waypoints: &[Waypoint],
    threats: &[wayfarer_core::threat::ThreatLocation],
    strategies: &EvasionStrategyTable,
    rng: &mut dyn rand::RngCore,
) -> Result<(Vec<Waypoint>, f64), PlannerError> {
    let relevant = threats_in_range(waypoints, threats);
    if relevant.is_empty() || waypoints.len() < 2 {
        return Ok((waypoints.to_vec(), 1.0));
    }

    let mut adapted = waypoints.to_vec();
    let mut touched = false;

    for i in 1..adapted.len() - 1 {
        for threat in &relevant {
            if adapted[i].position.range_to(&threat.position) >= threat.effect_radius {
                continue;
            }
            let strategy = strategies.get(threat.threat_type);
            apply_maneuver(&mut adapted[i], &strategy.maneuver, strategy.preferred_altitude, rng);
            touched = true;
        }
    }

    if touched {
        for i in 1..adapted.len() - 1 {
            for threat in &relevant {
                if adapted[i].position.range_to(&threat.position) < threat.effect_radius {
                    warn!(threat_type = ?threat.threat_type, "adapt: evasion could not clear threat radius");
                    return Err(PlannerError::NoRoute);
                }
            }
        }
        debug!(waypoints = adapted.len(), threats = relevant.len(), "adapt: applied evasion maneuvers");
    }

    let confidence = if touched { 0.9 } else { 1.0 };
    Ok((adapted, confidence))
}

fn apply_maneuver(
    waypoint: &mut Waypoint,
    maneuver: &EvasionManeuver,
    preferred_altitude: f64,
    rng: &mut dyn rand::RngCore,
) {
    match maneuver {
        EvasionManeuver::TerrainMask => {
            waypoint.position.z = preferred_altitude;
        }
        EvasionManeuver::HighAltitude => {
            waypoint.position.z = waypoint.position.z.max(preferred_altitude);
        }
        EvasionManeuver::SpeedBurst => {
            waypoint.velocity = waypoint.velocity * 1.5;
        }
        EvasionManeuver::Decoy => {
            use rand::Rng;
            let dx = rng.gen_range(-500.0..=500.0);
            let dy = rng.gen_range(-500.0..=500.0);
            waypoint.position = waypoint.position + Vector3::new(dx, dy, 0.0);
        }
    }
}

/// Sample a linear ballistic prediction for a threat at 1-second intervals
/// out to `horizon_secs`.
pub fn predict_track(
    threat: &wayfarer_core::threat::ThreatLocation,
    velocity: Vector3,
    horizon_secs: f64,
) -> Vec<(f64, Vector3)> {
    let steps = horizon_secs.floor() as i64;
    (0..=steps)
        .map(|s| {
            let t = s as f64;
            (t, threat.predicted_position(velocity, t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use wayfarer_core::enums::ThreatType;
    use wayfarer_core::types::{Instant, WaypointConstraints};

    fn constraints() -> WaypointConstraints {
        WaypointConstraints {
            max_speed: 100.0,
            max_acceleration: 10.0,
            min_altitude: 0.0,
            max_altitude: 15_000.0,
            stealth_required: false,
        }
    }

    fn waypoints_through(position: Vector3) -> Vec<Waypoint> {
        vec![
            Waypoint {
                position: Vector3::ZERO,
                velocity: Vector3::new(10.0, 0.0, 0.0),
                timestamp: Instant::from_secs_f64(0.0),
                constraints: constraints(),
            },
            Waypoint {
                position,
                velocity: Vector3::new(10.0, 0.0, 0.0),
                timestamp: Instant::from_secs_f64(1.0),
                constraints: constraints(),
            },
            Waypoint {
                position: Vector3::new(20_000.0, 0.0, 1000.0),
                velocity: Vector3::new(10.0, 0.0, 0.0),
                timestamp: Instant::from_secs_f64(2.0),
                constraints: constraints(),
            },
        ]
    }

    #[test]
    fn zero_threats_is_a_no_op() {
        let waypoints = waypoints_through(Vector3::new(5000.0, 0.0, 1000.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let strategies = EvasionStrategyTable::new();
        let (adapted, confidence) = adapt(&waypoints, &[], &strategies, &mut rng).unwrap();
        assert_eq!(confidence, 1.0);
        assert_eq!(adapted, waypoints);
    }

    #[test]
    fn sam_threat_raises_altitude_via_high_altitude_maneuver() {
        let waypoints = waypoints_through(Vector3::new(5000.0, 0.0, 1000.0));
        let threat = wayfarer_core::threat::ThreatLocation {
            position: Vector3::new(5000.0, 0.0, 1000.0),
            effect_radius: 800.0,
            confidence: 0.95,
            threat_type: ThreatType::Sam,
        };
        let strategies = EvasionStrategyTable::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (adapted, confidence) = adapt(&waypoints, &[threat], &strategies, &mut rng).unwrap();
        assert_eq!(confidence, 0.9);
        assert!(adapted[1].position.z >= strategies.get(ThreatType::Sam).preferred_altitude);
    }

    #[test]
    fn speed_burst_that_cannot_clear_the_radius_reports_no_route() {
        // an interceptor sitting exactly on the waypoint: a velocity-only
        // maneuver never moves the waypoint out of the effect radius.
        let waypoints = waypoints_through(Vector3::new(5000.0, 0.0, 1000.0));
        let threat = wayfarer_core::threat::ThreatLocation {
            position: Vector3::new(5000.0, 0.0, 1000.0),
            effect_radius: 800.0,
            confidence: 0.9,
            threat_type: ThreatType::Interceptor,
        };
        let strategies = EvasionStrategyTable::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = adapt(&waypoints, &[threat], &strategies, &mut rng);
        assert!(matches!(result, Err(PlannerError::NoRoute)));
    }

    #[test]
    fn predict_track_samples_at_one_second_intervals() {
        let threat = wayfarer_core::threat::ThreatLocation {
            position: Vector3::ZERO,
            effect_radius: 500.0,
            confidence: 0.5,
            threat_type: ThreatType::Radar,
        };
        let samples = predict_track(&threat, Vector3::new(10.0, 0.0, 0.0), 3.0);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[2].1, Vector3::new(20.0, 0.0, 0.0));
    }

    #[test]
    fn alert_level_reexport_matches_profiles() {
        assert_eq!(evaluate(&[]), crate::profiles::evaluate_alert_level(&[]));
    }
}
