#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use wayfarer_core::enums::{AlertLevel, ThreatType};
    use wayfarer_core::threat::{EvasionStrategyTable, ThreatLocation};
    use wayfarer_core::types::{Instant, Vector3, Waypoint, WaypointConstraints};

    use crate::{adapt, evaluate_alert_level};

    fn threat(position: Vector3, radius: f64, confidence: f64, threat_type: ThreatType) -> ThreatLocation {
        ThreatLocation {
            position,
            effect_radius: radius,
            confidence,
            threat_type,
        }
    }

    #[test]
    fn multiple_threats_escalate_to_the_worst_confidence() {
        let threats = vec![
            threat(Vector3::ZERO, 500.0, 0.2, ThreatType::Radar),
            threat(Vector3::new(1.0, 0.0, 0.0), 500.0, 0.92, ThreatType::Sam),
        ];
        assert_eq!(evaluate_alert_level(&threats), AlertLevel::Combat);
    }

    #[test]
    fn adaptation_leaves_distant_waypoints_untouched() {
        let constraints = WaypointConstraints {
            max_speed: 100.0,
            max_acceleration: 10.0,
            min_altitude: 0.0,
            max_altitude: 15_000.0,
            stealth_required: false,
        };
        let waypoints = vec![
            Waypoint {
                position: Vector3::ZERO,
                velocity: Vector3::new(10.0, 0.0, 0.0),
                timestamp: Instant::from_secs_f64(0.0),
                constraints,
            },
            Waypoint {
                position: Vector3::new(50_000.0, 0.0, 1000.0),
                velocity: Vector3::new(10.0, 0.0, 0.0),
                timestamp: Instant::from_secs_f64(1.0),
                constraints,
            },
        ];
        let far_threat = threat(Vector3::new(-50_000.0, 0.0, 0.0), 100.0, 0.5, ThreatType::Radar);
        let strategies = EvasionStrategyTable::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let (adapted, confidence) = adapt(&waypoints, &[far_threat], &strategies, &mut rng).unwrap();
        assert_eq!(confidence, 1.0);
        assert_eq!(adapted, waypoints);
    }
}
