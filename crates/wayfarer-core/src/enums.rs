//! Closed enumeration types shared across the planner.

use serde::{Deserialize, Serialize};

/// The kind of vehicle a plan is produced for. Each variant has a
/// corresponding entry in the `PayloadProfileRegistry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadClass {
    Humanoid,
    Uav,
    Rocket,
    Missile,
    Spacecraft,
    Drone,
    GroundRobot,
    Submarine,
    Interstellar,
}

impl PayloadClass {
    /// Every class the registry must cover at construction.
    pub const ALL: [PayloadClass; 9] = [
        PayloadClass::Humanoid,
        PayloadClass::Uav,
        PayloadClass::Rocket,
        PayloadClass::Missile,
        PayloadClass::Spacecraft,
        PayloadClass::Drone,
        PayloadClass::GroundRobot,
        PayloadClass::Submarine,
        PayloadClass::Interstellar,
    ];
}

/// The domain a payload operates in, derived from its profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingDomain {
    Ground,
    Air,
    Space,
    Underwater,
    Interstellar,
}

/// Mission priority, used to weight the scorer's selection step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// How aggressively the stealth capability should be invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StealthMode {
    #[default]
    None,
    Low,
    Medium,
    High,
    Maximum,
}

/// Escalation state driven by the maximum confidence among registered
/// threats. Ordered: `Normal < Elevated < High < Critical < Combat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    #[default]
    Normal,
    Elevated,
    High,
    Critical,
    Combat,
}

/// Gravity model used by the physics residual optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityModel {
    Flat,
    #[default]
    Spherical,
    J2,
    None,
}

/// Atmosphere model used when computing drag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtmosphereModel {
    #[default]
    None,
    Exponential,
    UsStandard,
}

/// Threat category, used to look up an `EvasionStrategy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatType {
    Radar,
    Sam,
    Interceptor,
    Jamming,
}

/// Evasive maneuver applied by the threat adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvasionManeuver {
    TerrainMask,
    HighAltitude,
    SpeedBurst,
    Decoy,
}

/// The objective a specialized agent in the pool is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentSpecialization {
    Stealth,
    Speed,
    Fuel,
    Threat,
    Terrain,
    Physics,
    MultiDomain,
}

impl AgentSpecialization {
    /// The fixed roster the agent pool is constructed with.
    pub const ALL: [AgentSpecialization; 7] = [
        AgentSpecialization::Stealth,
        AgentSpecialization::Speed,
        AgentSpecialization::Fuel,
        AgentSpecialization::Threat,
        AgentSpecialization::Terrain,
        AgentSpecialization::Physics,
        AgentSpecialization::MultiDomain,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_level_is_ordered() {
        assert!(AlertLevel::Normal < AlertLevel::Elevated);
        assert!(AlertLevel::Elevated < AlertLevel::High);
        assert!(AlertLevel::High < AlertLevel::Critical);
        assert!(AlertLevel::Critical < AlertLevel::Combat);
    }

    #[test]
    fn payload_class_roundtrips_through_json() {
        for class in PayloadClass::ALL {
            let json = serde_json::to_string(&class).unwrap();
            let back: PayloadClass = serde_json::from_str(&json).unwrap();
            assert_eq!(class, back);
        }
    }
}
