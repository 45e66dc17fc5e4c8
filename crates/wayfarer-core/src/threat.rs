//! Threat records and the evasion strategy table keyed by threat type.
//!
//! A per-archetype lookup table, narrowed to the four threat types the
//! adapter (C6) reacts to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::{EvasionManeuver, ThreatType};
use crate::types::Vector3;

/// A registered threat: where it is, how far it reaches, how sure we are
/// it's real.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatLocation {
    pub position: Vector3,
    pub effect_radius: f64,
    pub confidence: f64,
    pub threat_type: ThreatType,
}

impl ThreatLocation {
    /// Deterministic id derived from the integer-truncated position, used
    /// by the orchestrator's register/clear interface.
    pub fn derived_id(&self) -> String {
        format!(
            "threat-{}-{}-{}",
            self.position.x as i64, self.position.y as i64, self.position.z as i64
        )
    }

    /// Linear ballistic prediction: `location + velocity * t`.
    pub fn predicted_position(&self, velocity: Vector3, t: f64) -> Vector3 {
        self.position + velocity * t
    }
}

/// The maneuver and cost profile used to evade a given threat type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvasionStrategy {
    pub preferred_altitude: f64,
    pub preferred_speed: f64,
    pub maneuver: EvasionManeuver,
    pub success_rate: f64,
    pub fuel_cost: f64,
}

/// Fixed lookup from threat type to its evasion strategy.
#[derive(Debug, Clone)]
pub struct EvasionStrategyTable {
    strategies: HashMap<ThreatType, EvasionStrategy>,
}

impl EvasionStrategyTable {
    pub fn new() -> Self {
        let mut strategies = HashMap::new();
        strategies.insert(
            ThreatType::Radar,
            EvasionStrategy {
                preferred_altitude: 30.0,
                preferred_speed: 40.0,
                maneuver: EvasionManeuver::TerrainMask,
                success_rate: 0.7,
                fuel_cost: 5.0,
            },
        );
        strategies.insert(
            ThreatType::Sam,
            EvasionStrategy {
                preferred_altitude: 15_000.0,
                preferred_speed: 60.0,
                maneuver: EvasionManeuver::HighAltitude,
                success_rate: 0.6,
                fuel_cost: 15.0,
            },
        );
        strategies.insert(
            ThreatType::Interceptor,
            EvasionStrategy {
                preferred_altitude: 10_000.0,
                preferred_speed: 120.0,
                maneuver: EvasionManeuver::SpeedBurst,
                success_rate: 0.5,
                fuel_cost: 25.0,
            },
        );
        strategies.insert(
            ThreatType::Jamming,
            EvasionStrategy {
                preferred_altitude: 5000.0,
                preferred_speed: 50.0,
                maneuver: EvasionManeuver::Decoy,
                success_rate: 0.65,
                fuel_cost: 8.0,
            },
        );
        Self { strategies }
    }

    pub fn get(&self, threat_type: ThreatType) -> EvasionStrategy {
        self.strategies
            .get(&threat_type)
            .copied()
            .expect("every ThreatType variant has a registered strategy")
    }
}

impl Default for EvasionStrategyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_id_is_stable_for_the_same_truncated_position() {
        let threat = ThreatLocation {
            position: Vector3::new(5000.4, 0.9, 1000.0),
            effect_radius: 800.0,
            confidence: 0.95,
            threat_type: ThreatType::Sam,
        };
        assert_eq!(threat.derived_id(), "threat-5000-0-1000");
    }

    #[test]
    fn every_threat_type_has_a_strategy() {
        let table = EvasionStrategyTable::new();
        for threat_type in [
            ThreatType::Radar,
            ThreatType::Sam,
            ThreatType::Interceptor,
            ThreatType::Jamming,
        ] {
            let _ = table.get(threat_type);
        }
    }
}
