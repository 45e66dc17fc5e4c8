#[cfg(test)]
mod tests {
    use crate::config::PlannerConfig;
    use crate::enums::{AlertLevel, PayloadClass, Priority, StealthMode, ThreatType};
    use crate::profiles::PayloadProfileRegistry;
    use crate::request::{PlanConstraints, PlanRequest};
    use crate::threat::ThreatLocation;
    use crate::types::Vector3;

    #[test]
    fn plan_request_round_trips_through_json() {
        let request = PlanRequest {
            start: Vector3::ZERO,
            target: Vector3::new(10_000.0, 0.0, 1000.0),
            payload_class: PayloadClass::Uav,
            max_time: 30.0,
            priority: Priority::Normal,
            stealth_mode: StealthMode::None,
            constraints: PlanConstraints {
                threats: vec![ThreatLocation {
                    position: Vector3::new(5000.0, 0.0, 1000.0),
                    effect_radius: 800.0,
                    confidence: 0.95,
                    threat_type: ThreatType::Sam,
                }],
                stealth_required: false,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: PlanRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, back);
    }

    #[test]
    fn default_config_and_registry_agree_on_coverage() {
        let registry = PayloadProfileRegistry::new();
        let config = PlannerConfig::default();
        assert!(config.k_marl > 0);
        assert!(config.k_rule > 0);
        for class in PayloadClass::ALL {
            assert!(registry.get(class).is_ok());
        }
    }

    #[test]
    fn alert_level_default_is_normal() {
        assert_eq!(AlertLevel::default(), AlertLevel::Normal);
    }
}
