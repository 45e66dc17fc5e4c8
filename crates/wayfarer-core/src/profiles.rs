//! Payload and physics profiles, and the read-only registry mapping a
//! `PayloadClass` to its `PayloadProfile` (component C1).
//!
//! A per-archetype lookup table built once into a `HashMap` at
//! construction, so lookup is a true O(1) `HashMap::get` and the full
//! class roster can be iterated (the orchestrator needs that to validate
//! its configuration at startup).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::{AtmosphereModel, GravityModel, OperatingDomain, PayloadClass};
use crate::error::PlannerError;

/// Per-axis penalty weight applied to a physics constraint violation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintPenalty {
    pub max_q: f64,
    pub thermal_limit: f64,
    pub max_q_weight: f64,
    pub thermal_weight: f64,
}

/// Coarse equations-of-motion parameters for the residual optimizer (C4).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsModel {
    pub mass: f64,
    pub drag_coeff: f64,
    pub lift_coeff: f64,
    pub thrust_capacity: f64,
    pub fuel_consumption_rate: f64,
    pub gravity_model: GravityModel,
    pub atmosphere_model: AtmosphereModel,
    pub constraints: ConstraintPenalty,
}

impl PhysicsModel {
    /// Gravity vector (0, 0, -g) for the configured model, `ZERO` if `None`.
    pub fn gravity_vector(&self) -> crate::types::Vector3 {
        match self.gravity_model {
            GravityModel::None => crate::types::Vector3::ZERO,
            _ => crate::types::Vector3::new(0.0, 0.0, -9.81),
        }
    }
}

/// Static per-payload-class kinematic envelope and linked physics model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadProfile {
    pub class: PayloadClass,
    pub min_speed: f64,
    pub max_speed: f64,
    pub max_acceleration: f64,
    pub min_altitude: f64,
    pub max_altitude: f64,
    pub max_turn_rate: f64,
    pub fuel_capacity: f64,
    pub fuel_efficiency: f64,
    pub stealth_capability: f64,
    pub sensor_range: f64,
    pub comms_range: f64,
    pub operating_domain: OperatingDomain,
    pub physics: PhysicsModel,
}

/// Read-only mapping from payload class to its profile. Populated once at
/// construction with the fixed class roster; never mutated afterward.
#[derive(Debug, Clone)]
pub struct PayloadProfileRegistry {
    profiles: HashMap<PayloadClass, PayloadProfile>,
}

impl PayloadProfileRegistry {
    /// Build the registry with the built-in defaults for every payload class.
    pub fn new() -> Self {
        let mut profiles = HashMap::new();
        for class in PayloadClass::ALL {
            profiles.insert(class, default_profile(class));
        }
        Self { profiles }
    }

    /// Build a registry from an explicit subset of profiles. Used in tests
    /// to exercise lookups against a registry missing a class; production
    /// code always goes through `new`, which covers every class.
    pub fn from_profiles(profiles: HashMap<PayloadClass, PayloadProfile>) -> Self {
        Self { profiles }
    }

    /// Look up the profile for a payload class. O(1).
    pub fn get(&self, class: PayloadClass) -> Result<&PayloadProfile, PlannerError> {
        self.profiles
            .get(&class)
            .ok_or(PlannerError::UnsupportedPayload { class })
    }

    pub fn all_classes(&self) -> impl Iterator<Item = &PayloadClass> {
        self.profiles.keys()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for PayloadProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn default_physics(mass: f64, drag_coeff: f64, gravity_model: GravityModel) -> PhysicsModel {
    PhysicsModel {
        mass,
        drag_coeff,
        lift_coeff: 0.3,
        thrust_capacity: mass * 20.0,
        fuel_consumption_rate: 0.01,
        gravity_model,
        atmosphere_model: match gravity_model {
            GravityModel::None => AtmosphereModel::None,
            _ => AtmosphereModel::Exponential,
        },
        constraints: ConstraintPenalty {
            max_q: 50_000.0,
            thermal_limit: 2000.0,
            max_q_weight: 1.0,
            thermal_weight: 1.0,
        },
    }
}

/// Built-in envelope values for each payload class. Domain-specific:
/// submarine altitude is negative, interstellar is unbounded.
fn default_profile(class: PayloadClass) -> PayloadProfile {
    match class {
        PayloadClass::Humanoid => PayloadProfile {
            class,
            min_speed: 0.0,
            max_speed: 3.0,
            max_acceleration: 2.0,
            min_altitude: 0.0,
            max_altitude: 50.0,
            max_turn_rate: std::f64::consts::PI,
            fuel_capacity: 0.0,
            fuel_efficiency: 1.0,
            stealth_capability: 0.2,
            sensor_range: 50.0,
            comms_range: 500.0,
            operating_domain: OperatingDomain::Ground,
            physics: default_physics(80.0, 0.8, GravityModel::Flat),
        },
        PayloadClass::Uav => PayloadProfile {
            class,
            min_speed: 10.0,
            max_speed: 60.0,
            max_acceleration: 8.0,
            min_altitude: 50.0,
            max_altitude: 15_000.0,
            max_turn_rate: 0.5,
            fuel_capacity: 200.0,
            fuel_efficiency: 0.8,
            stealth_capability: 0.4,
            sensor_range: 20_000.0,
            comms_range: 100_000.0,
            operating_domain: OperatingDomain::Air,
            physics: default_physics(25.0, 0.3, GravityModel::Spherical),
        },
        PayloadClass::Drone => PayloadProfile {
            class,
            min_speed: 0.0,
            max_speed: 25.0,
            max_acceleration: 6.0,
            min_altitude: 0.0,
            max_altitude: 500.0,
            max_turn_rate: 1.0,
            fuel_capacity: 30.0,
            fuel_efficiency: 0.7,
            stealth_capability: 0.3,
            sensor_range: 2000.0,
            comms_range: 5000.0,
            operating_domain: OperatingDomain::Air,
            physics: default_physics(5.0, 0.2, GravityModel::Flat),
        },
        PayloadClass::GroundRobot => PayloadProfile {
            class,
            min_speed: 0.0,
            max_speed: 15.0,
            max_acceleration: 4.0,
            min_altitude: -50.0,
            max_altitude: 4000.0,
            max_turn_rate: std::f64::consts::PI / 2.0,
            fuel_capacity: 150.0,
            fuel_efficiency: 0.9,
            stealth_capability: 0.1,
            sensor_range: 500.0,
            comms_range: 5000.0,
            operating_domain: OperatingDomain::Ground,
            physics: default_physics(300.0, 1.2, GravityModel::Flat),
        },
        PayloadClass::Rocket => PayloadProfile {
            class,
            min_speed: 0.0,
            max_speed: 3000.0,
            max_acceleration: 150.0,
            min_altitude: 0.0,
            max_altitude: 200_000.0,
            max_turn_rate: 0.2,
            fuel_capacity: 50_000.0,
            fuel_efficiency: 0.4,
            stealth_capability: 0.0,
            sensor_range: 50_000.0,
            comms_range: 500_000.0,
            operating_domain: OperatingDomain::Air,
            physics: default_physics(5000.0, 0.1, GravityModel::Spherical),
        },
        PayloadClass::Missile => PayloadProfile {
            class,
            min_speed: 200.0,
            max_speed: 1400.0,
            max_acceleration: 100.0,
            min_altitude: 0.0,
            max_altitude: 30_000.0,
            max_turn_rate: 0.5,
            fuel_capacity: 500.0,
            fuel_efficiency: 0.5,
            stealth_capability: 0.25,
            sensor_range: 40_000.0,
            comms_range: 100_000.0,
            operating_domain: OperatingDomain::Air,
            physics: default_physics(600.0, 0.2, GravityModel::Spherical),
        },
        PayloadClass::Spacecraft => PayloadProfile {
            class,
            min_speed: 0.0,
            max_speed: 11_000.0,
            max_acceleration: 30.0,
            min_altitude: 100_000.0,
            max_altitude: 2_000_000.0,
            max_turn_rate: 0.05,
            fuel_capacity: 20_000.0,
            fuel_efficiency: 0.6,
            stealth_capability: 0.05,
            sensor_range: 1_000_000.0,
            comms_range: 10_000_000.0,
            operating_domain: OperatingDomain::Space,
            physics: default_physics(2000.0, 0.0, GravityModel::J2),
        },
        PayloadClass::Submarine => PayloadProfile {
            class,
            min_speed: 0.0,
            max_speed: 20.0,
            max_acceleration: 1.5,
            min_altitude: -1000.0,
            max_altitude: 0.0,
            max_turn_rate: 0.1,
            fuel_capacity: 10_000.0,
            fuel_efficiency: 0.95,
            stealth_capability: 0.8,
            sensor_range: 10_000.0,
            comms_range: 2000.0,
            operating_domain: OperatingDomain::Underwater,
            physics: default_physics(8000.0, 0.5, GravityModel::Flat),
        },
        PayloadClass::Interstellar => PayloadProfile {
            class,
            min_speed: 0.0,
            max_speed: 3e7,
            max_acceleration: 0.5,
            min_altitude: f64::NEG_INFINITY,
            max_altitude: f64::INFINITY,
            max_turn_rate: 0.001,
            fuel_capacity: 1e6,
            fuel_efficiency: 0.99,
            stealth_capability: 0.0,
            sensor_range: 1e12,
            comms_range: 1e13,
            operating_domain: OperatingDomain::Interstellar,
            physics: default_physics(10_000.0, 0.0, GravityModel::None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_payload_class() {
        let registry = PayloadProfileRegistry::new();
        assert_eq!(registry.len(), PayloadClass::ALL.len());
        for class in PayloadClass::ALL {
            assert!(registry.get(class).is_ok());
        }
    }

    #[test]
    fn unknown_class_lookup_is_unreachable_but_registry_rejects_gaps() {
        // every PayloadClass variant is covered; a registry built from a
        // strict subset should fail on the missing classes.
        let mut profiles = HashMap::new();
        profiles.insert(PayloadClass::Uav, default_profile(PayloadClass::Uav));
        let partial = PayloadProfileRegistry { profiles };
        assert!(matches!(
            partial.get(PayloadClass::Submarine),
            Err(PlannerError::UnsupportedPayload { .. })
        ));
    }

    #[test]
    fn submarine_altitude_is_negative() {
        let registry = PayloadProfileRegistry::new();
        let profile = registry.get(PayloadClass::Submarine).unwrap();
        assert!(profile.min_altitude < 0.0);
        assert!(profile.max_altitude <= 0.0);
    }

    #[test]
    fn interstellar_altitude_is_unbounded() {
        let registry = PayloadProfileRegistry::new();
        let profile = registry.get(PayloadClass::Interstellar).unwrap();
        assert_eq!(profile.min_altitude, f64::NEG_INFINITY);
        assert_eq!(profile.max_altitude, f64::INFINITY);
    }
}
