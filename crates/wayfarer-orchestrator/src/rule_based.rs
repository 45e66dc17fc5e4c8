//! Rule-based candidate generation: simple per-domain altitude presets
//! connecting start -> mid -> target, with 3-7 interior waypoints
//! varying per variant. A small table keyed by domain rather than
//! anything learned or randomized.

use wayfarer_core::enums::OperatingDomain;
use wayfarer_core::profiles::PayloadProfile;
use wayfarer_core::request::PlanRequest;
use wayfarer_core::types::{Instant, Vector3, Waypoint, WaypointConstraints};

fn altitude_presets(domain: OperatingDomain) -> [f64; 3] {
    match domain {
        OperatingDomain::Ground => [0.0, 2.0, 10.0],
        OperatingDomain::Air => [1_000.0, 5_000.0, 12_000.0],
        OperatingDomain::Space => [150_000.0, 400_000.0, 800_000.0],
        OperatingDomain::Underwater => [-50.0, -200.0, -600.0],
        OperatingDomain::Interstellar => [0.0, 0.0, 0.0],
    }
}

fn lerp_vec(a: Vector3, b: Vector3, t: f64) -> Vector3 {
    a + (b - a) * t
}

fn back_compute_velocities(waypoints: &mut [Waypoint]) {
    let n = waypoints.len();
    if n < 2 {
        return;
    }
    for i in 0..n - 1 {
        let dt = waypoints[i + 1].timestamp.seconds_since(waypoints[i].timestamp);
        let dt = if dt.abs() < 1e-9 { 1.0 } else { dt };
        waypoints[i].velocity = (waypoints[i + 1].position - waypoints[i].position) / dt;
    }
    waypoints[n - 1].velocity = waypoints[n - 2].velocity;
}

fn build_variant(
    request: &PlanRequest,
    constraints: &WaypointConstraints,
    altitude: f64,
    interior: usize,
    cruise_speed: f64,
) -> Vec<Waypoint> {
    let total_points = interior + 2;
    let mut waypoints = Vec::with_capacity(total_points);
    let mut elapsed = 0.0;
    let mut prev_position = request.start;
    for i in 0..total_points {
        let t = i as f64 / (total_points - 1) as f64;
        let mut position = lerp_vec(request.start, request.target, t);
        if i != 0 && i != total_points - 1 {
            position.z = altitude;
        }
        if i > 0 {
            elapsed += prev_position.range_to(&position) / cruise_speed;
        }
        prev_position = position;
        waypoints.push(Waypoint {
            position,
            velocity: Vector3::ZERO,
            timestamp: Instant::from_secs_f64(elapsed),
            constraints: *constraints,
        });
    }
    back_compute_velocities(&mut waypoints);
    waypoints
}

/// Build `k_rule` deterministic per-domain candidates, cycling through the
/// domain's altitude presets and varying interior waypoint count 3..=7.
pub fn generate(request: &PlanRequest, profile: &PayloadProfile, k_rule: usize) -> Vec<Vec<Waypoint>> {
    let presets = altitude_presets(profile.operating_domain);
    let constraints = WaypointConstraints {
        max_speed: profile.max_speed,
        max_acceleration: profile.max_acceleration,
        min_altitude: profile.min_altitude,
        max_altitude: profile.max_altitude,
        stealth_required: request.constraints.stealth_required,
    };
    let cruise_speed = ((profile.min_speed.max(1.0) + profile.max_speed) / 2.0).max(1.0);

    (0..k_rule)
        .map(|variant| {
            let altitude = presets[variant % presets.len()].clamp(profile.min_altitude, profile.max_altitude);
            let interior = (3 + variant % 5).min(7);
            build_variant(request, &constraints, altitude, interior, cruise_speed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::enums::{PayloadClass, Priority, StealthMode};
    use wayfarer_core::profiles::PayloadProfileRegistry;
    use wayfarer_core::request::PlanConstraints;

    fn uav_request() -> (PlanRequest, PayloadProfile) {
        let registry = PayloadProfileRegistry::new();
        let profile = registry.get(PayloadClass::Uav).unwrap().clone();
        let request = PlanRequest {
            start: Vector3::new(0.0, 0.0, 1000.0),
            target: Vector3::new(10_000.0, 0.0, 1000.0),
            payload_class: PayloadClass::Uav,
            max_time: 600.0,
            priority: Priority::Normal,
            stealth_mode: StealthMode::None,
            constraints: PlanConstraints::default(),
        };
        (request, profile)
    }

    #[test]
    fn every_variant_has_between_five_and_nine_waypoints_and_matches_endpoints() {
        let (request, profile) = uav_request();
        let candidates = generate(&request, &profile, 3);
        assert_eq!(candidates.len(), 3);
        for candidate in &candidates {
            assert!(candidate.len() >= 5 && candidate.len() <= 9);
            assert_eq!(candidate[0].position, request.start);
            assert_eq!(candidate.last().unwrap().position, request.target);
        }
    }

    #[test]
    fn interior_altitude_follows_the_domain_preset() {
        let (request, profile) = uav_request();
        let candidates = generate(&request, &profile, 1);
        let candidate = &candidates[0];
        assert_eq!(candidate[1].position.z, 1_000.0);
    }
}
