//! Fundamental geometric and trajectory types.

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::enums::PayloadClass;

/// Three ordered reals, used both as a position (meters, payload-dependent
/// frame) and as a velocity (m/s). x = East, y = North, z = Up (altitude).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point (when used as a position).
    pub fn range_to(&self, other: &Vector3) -> f64 {
        (*other - *self).magnitude()
    }

    /// Horizontal (XY) distance, ignoring altitude.
    pub fn horizontal_range_to(&self, other: &Vector3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bearing to another point in radians (0 = North/+y, clockwise).
    pub fn bearing_to(&self, other: &Vector3) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx.atan2(dy).rem_euclid(std::f64::consts::TAU)
    }

    /// Magnitude (when used as a velocity, this is speed).
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Horizontal magnitude, ignoring the z component.
    pub fn horizontal_magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Heading in radians (0 = North/+y, clockwise), when used as a velocity.
    pub fn heading(&self) -> f64 {
        self.x.atan2(self.y).rem_euclid(std::f64::consts::TAU)
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;
    fn div(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Absolute instant, nanosecond resolution, stored as a signed epoch offset
/// so deltas between two instants can be computed without underflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instant {
    pub nanos_since_epoch: i64,
}

impl Instant {
    /// Current wall-clock time, nanosecond-truncated since the Unix epoch.
    /// Used only for `Trajectory::created_at` and experience timestamps —
    /// never for rollout/physics timing, which is relative and injected.
    pub fn now() -> Self {
        let since_epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            nanos_since_epoch: since_epoch.as_nanos() as i64,
        }
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos_since_epoch: (secs * 1e9) as i64,
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.nanos_since_epoch as f64 / 1e9
    }

    /// Signed seconds elapsed from `earlier` to `self`.
    pub fn seconds_since(&self, earlier: Instant) -> f64 {
        (self.nanos_since_epoch - earlier.nanos_since_epoch) as f64 / 1e9
    }

    pub fn plus_secs(&self, secs: f64) -> Instant {
        Instant::from_secs_f64(self.as_secs_f64() + secs)
    }
}

/// Per-waypoint flight constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointConstraints {
    pub max_speed: f64,
    pub max_acceleration: f64,
    pub min_altitude: f64,
    pub max_altitude: f64,
    pub stealth_required: bool,
}

/// One node of a planned path: position, velocity, absolute time, and the
/// local constraints in force at that point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vector3,
    pub velocity: Vector3,
    pub timestamp: Instant,
    pub constraints: WaypointConstraints,
}

/// Unique trajectory identifier, assigned by the orchestrator's atomic
/// counter at commit time (ordered, not random, so the experience buffer's
/// oldest-first eviction matches trajectory creation order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrajectoryId(pub u64);

/// An ordered sequence of waypoints plus the metrics derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: TrajectoryId,
    pub payload_class: PayloadClass,
    pub waypoints: Vec<Waypoint>,
    pub total_distance: f64,
    pub estimated_time: f64,
    pub stealth_score: f64,
    pub threat_exposure: f64,
    pub fuel_required: f64,
    pub confidence: f64,
    pub created_at: Instant,
}

impl Trajectory {
    /// Sum of consecutive waypoint-to-waypoint distances.
    pub fn compute_total_distance(waypoints: &[Waypoint]) -> f64 {
        waypoints
            .windows(2)
            .map(|w| w[0].position.range_to(&w[1].position))
            .sum()
    }

    /// Elapsed seconds from the first to the last waypoint.
    pub fn compute_estimated_time(waypoints: &[Waypoint]) -> f64 {
        match (waypoints.first(), waypoints.last()) {
            (Some(first), Some(last)) => last.timestamp.seconds_since(first.timestamp),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector3_range_and_bearing() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(3.0, 4.0, 0.0);
        assert!((a.range_to(&b) - 5.0).abs() < 1e-9);
        assert!((a.horizontal_range_to(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn vector3_arithmetic() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        let sum = a + b;
        assert_eq!(sum, Vector3::new(5.0, 7.0, 9.0));
        let scaled = a * 2.0;
        assert_eq!(scaled, Vector3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn instant_seconds_since_can_be_negative() {
        let earlier = Instant::from_secs_f64(10.0);
        let later = Instant::from_secs_f64(4.0);
        assert!(later.seconds_since(earlier) < 0.0);
    }

    #[test]
    fn trajectory_metrics_from_waypoints() {
        let t0 = Instant::from_secs_f64(0.0);
        let constraints = WaypointConstraints {
            max_speed: 100.0,
            max_acceleration: 10.0,
            min_altitude: 0.0,
            max_altitude: 10_000.0,
            stealth_required: false,
        };
        let wps = vec![
            Waypoint {
                position: Vector3::new(0.0, 0.0, 0.0),
                velocity: Vector3::ZERO,
                timestamp: t0,
                constraints,
            },
            Waypoint {
                position: Vector3::new(100.0, 0.0, 0.0),
                velocity: Vector3::ZERO,
                timestamp: t0.plus_secs(10.0),
                constraints,
            },
        ];
        assert!((Trajectory::compute_total_distance(&wps) - 100.0).abs() < 1e-9);
        assert!((Trajectory::compute_estimated_time(&wps) - 10.0).abs() < 1e-9);
    }
}
