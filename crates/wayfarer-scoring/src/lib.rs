//! Multi-criteria scoring, Pareto filtering, and crowding-distance
//! tie-break (component C5).

use wayfarer_core::enums::Priority;
use wayfarer_core::profiles::PayloadProfile;
use wayfarer_core::types::{Trajectory, Waypoint};

pub const WEIGHT_DISTANCE: f64 = 0.15;
pub const WEIGHT_TIME: f64 = 0.15;
pub const WEIGHT_FUEL: f64 = 0.15;
pub const WEIGHT_STEALTH: f64 = 0.20;
pub const WEIGHT_THREAT_EXPOSURE: f64 = 0.20;
pub const WEIGHT_PHYSICS_FEASIBILITY: f64 = 0.10;
pub const WEIGHT_SMOOTHNESS: f64 = 0.05;

/// Per-criterion normalized scores, all in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriterionScores {
    pub distance: f64,
    pub time: f64,
    pub fuel: f64,
    pub stealth: f64,
    pub threat_exposure: f64,
    pub physics_feasibility: f64,
    pub smoothness: f64,
}

impl CriterionScores {
    fn as_array(&self) -> [f64; 7] {
        [
            self.distance,
            self.time,
            self.fuel,
            self.stealth,
            self.threat_exposure,
            self.physics_feasibility,
            self.smoothness,
        ]
    }

    pub fn weighted_total(&self) -> f64 {
        self.distance * WEIGHT_DISTANCE
            + self.time * WEIGHT_TIME
            + self.fuel * WEIGHT_FUEL
            + self.stealth * WEIGHT_STEALTH
            + self.threat_exposure * WEIGHT_THREAT_EXPOSURE
            + self.physics_feasibility * WEIGHT_PHYSICS_FEASIBILITY
            + self.smoothness * WEIGHT_SMOOTHNESS
    }

    /// Weighted total after the priority-specific boost.
    pub fn priority_weighted_total(&self, priority: Priority) -> f64 {
        let total = self.weighted_total();
        match priority {
            Priority::Critical => total * (1.0 + 0.5 * self.threat_exposure),
            Priority::High => total * (1.0 + 0.25 * (self.time + self.threat_exposure)),
            Priority::Normal | Priority::Low => total,
        }
    }

    /// `true` if `self` dominates `other`: at least as good on every
    /// criterion, strictly better on at least one.
    pub fn dominates(&self, other: &CriterionScores) -> bool {
        let a = self.as_array();
        let b = other.as_array();
        a.iter().zip(b.iter()).all(|(x, y)| x >= y)
            && a.iter().zip(b.iter()).any(|(x, y)| x > y)
    }
}

/// Fraction of consecutive waypoint pairs whose finite-difference velocity
/// is within 10 m/s of the stored velocity and whose implied acceleration
/// stays within `2 * max_acceleration`. Returns 1.0 for
/// trajectories with fewer than 2 waypoints.
pub fn physics_feasibility(waypoints: &[Waypoint], profile: &PayloadProfile) -> f64 {
    if waypoints.len() < 2 {
        return 1.0;
    }
    let mut consistent = 0usize;
    let pairs = waypoints.len() - 1;
    for w in waypoints.windows(2) {
        let dt = {
            let raw = w[1].timestamp.seconds_since(w[0].timestamp);
            if raw.abs() < 1e-9 {
                1.0
            } else {
                raw
            }
        };
        let finite_diff_velocity = (w[1].position - w[0].position) / dt;
        let velocity_ok = (finite_diff_velocity - w[0].velocity).magnitude() <= 10.0;

        let accel = (w[1].velocity - w[0].velocity) / dt;
        let accel_ok = accel.magnitude() <= 2.0 * profile.max_acceleration;

        if velocity_ok && accel_ok {
            consistent += 1;
        }
    }
    consistent as f64 / pairs as f64
}

/// Mean magnitude of jerk (rate of change of acceleration) across interior
/// waypoints, used by the smoothness criterion.
pub fn mean_jerk(waypoints: &[Waypoint]) -> f64 {
    if waypoints.len() < 3 {
        return 0.0;
    }
    let accelerations: Vec<_> = waypoints
        .windows(2)
        .map(|w| {
            let dt = {
                let raw = w[1].timestamp.seconds_since(w[0].timestamp);
                if raw.abs() < 1e-9 {
                    1.0
                } else {
                    raw
                }
            };
            (w[1].velocity - w[0].velocity) / dt
        })
        .collect();
    if accelerations.len() < 2 {
        return 0.0;
    }
    let jerks: Vec<f64> = accelerations
        .windows(2)
        .map(|a| (a[1] - a[0]).magnitude())
        .collect();
    jerks.iter().sum::<f64>() / jerks.len() as f64
}

/// Compute every criterion for one trajectory against its payload profile.
pub fn score(trajectory: &Trajectory, profile: &PayloadProfile) -> CriterionScores {
    CriterionScores {
        distance: 1.0 / (1.0 + trajectory.total_distance / 10_000.0),
        time: 1.0 / (1.0 + trajectory.estimated_time / 3600.0),
        fuel: 1.0 / (1.0 + trajectory.fuel_required / 100.0),
        stealth: trajectory.stealth_score,
        threat_exposure: 1.0 - trajectory.threat_exposure,
        physics_feasibility: physics_feasibility(&trajectory.waypoints, profile),
        smoothness: 1.0 / (1.0 + mean_jerk(&trajectory.waypoints) / 10.0),
    }
}

/// Indices (into `scores`) of the non-dominated candidates.
pub fn pareto_front(scores: &[CriterionScores]) -> Vec<usize> {
    (0..scores.len())
        .filter(|&i| {
            !(0..scores.len()).any(|j| j != i && scores[j].dominates(&scores[i]))
        })
        .collect()
}

/// NSGA-II-style crowding distance over a front. Boundary points (when
/// sorted by any single criterion) get `+INFINITY`; interior points
/// accumulate `(next - prev) / range` per criterion, skipping zero-range
/// criteria.
pub fn crowding_distance(front: &[CriterionScores]) -> Vec<f64> {
    let n = front.len();
    if n == 0 {
        return Vec::new();
    }
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let mut distances = vec![0.0; n];
    for criterion in 0..7 {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            front[a].as_array()[criterion]
                .partial_cmp(&front[b].as_array()[criterion])
                .unwrap()
        });

        let min = front[order[0]].as_array()[criterion];
        let max = front[order[n - 1]].as_array()[criterion];
        let range = max - min;

        distances[order[0]] = f64::INFINITY;
        distances[order[n - 1]] = f64::INFINITY;

        if range <= 0.0 {
            continue;
        }
        for w in 1..n - 1 {
            let prev = front[order[w - 1]].as_array()[criterion];
            let next = front[order[w + 1]].as_array()[criterion];
            if distances[order[w]].is_finite() {
                distances[order[w]] += (next - prev) / range;
            }
        }
    }
    distances
}

/// Select the best index from a Pareto front: highest priority-weighted
/// total; within 0.01 of each other, the larger crowding distance wins.
pub fn select(front_scores: &[CriterionScores], priority: Priority) -> Option<usize> {
    if front_scores.is_empty() {
        return None;
    }
    let totals: Vec<f64> = front_scores
        .iter()
        .map(|s| s.priority_weighted_total(priority))
        .collect();
    let distances = crowding_distance(front_scores);

    let mut best = 0;
    for i in 1..front_scores.len() {
        let close = (totals[i] - totals[best]).abs() <= 0.01;
        if close {
            if distances[i] > distances[best] {
                best = i;
            }
        } else if totals[i] > totals[best] {
            best = i;
        }
    }
    Some(best)
}
