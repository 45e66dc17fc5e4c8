//! Physics residual optimizer (component C4): nudges interior waypoints
//! toward consistency with the payload's coarse equations of motion,
//! holding both endpoints fixed.

use thiserror::Error;
use tracing::debug;

use wayfarer_core::profiles::PhysicsModel;
use wayfarer_core::types::{Vector3, Waypoint};

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("trajectory has fewer than 2 waypoints")]
    TooFewWaypoints,
}

/// Per-round loss bookkeeping, kept so the adaptive weight rule can look
/// at what dominated the previous round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossRecord {
    pub data_loss: f64,
    pub physics_loss: f64,
    pub boundary_loss: f64,
    pub total_loss: f64,
    pub iteration: usize,
}

/// Per-loss-category scalar weight, bounded to `[0.1, 10.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveWeights {
    pub data: f64,
    pub physics: f64,
    pub boundary: f64,
}

impl Default for AdaptiveWeights {
    fn default() -> Self {
        Self {
            data: 1.0,
            physics: 1.0,
            boundary: 1.0,
        }
    }
}

impl AdaptiveWeights {
    const LOWER: f64 = 0.1;
    const UPPER: f64 = 10.0;

    /// Decrease whichever loss dominated, increase the rest, clamp.
    fn update(&mut self, record: &LossRecord) {
        let (data_is_max, physics_is_max, boundary_is_max) = {
            let max = record
                .data_loss
                .max(record.physics_loss)
                .max(record.boundary_loss);
            (
                record.data_loss >= max,
                record.physics_loss >= max,
                record.boundary_loss >= max,
            )
        };
        self.data = self.adjust(self.data, data_is_max);
        self.physics = self.adjust(self.physics, physics_is_max);
        self.boundary = self.adjust(self.boundary, boundary_is_max);
    }

    fn adjust(&self, weight: f64, is_dominant: bool) -> f64 {
        let scaled = if is_dominant { weight * 0.9 } else { weight * 1.1 };
        scaled.clamp(Self::LOWER, Self::UPPER)
    }
}

/// Residuals for one interior waypoint.
struct Residual {
    position: Vector3,
    velocity: Vector3,
}

fn safe_dt(seconds: f64) -> f64 {
    if seconds.abs() < 1e-9 {
        1.0
    } else {
        seconds
    }
}

fn gravity_vector(physics: &PhysicsModel) -> Vector3 {
    physics.gravity_vector()
}

fn compute_residual(waypoints: &[Waypoint], i: usize, physics: &PhysicsModel) -> Residual {
    let dt1 = safe_dt(waypoints[i].timestamp.seconds_since(waypoints[i - 1].timestamp));
    let dt2 = safe_dt(waypoints[i + 1].timestamp.seconds_since(waypoints[i].timestamp));

    let numerical_velocity =
        (waypoints[i + 1].position - waypoints[i - 1].position) / (dt1 + dt2);
    let position_residual = numerical_velocity - waypoints[i].velocity;

    let v_forward = (waypoints[i + 1].position - waypoints[i].position) / dt2;
    let v_backward = (waypoints[i].position - waypoints[i - 1].position) / dt1;
    let numerical_acceleration = (v_forward - v_backward) / ((dt1 + dt2) / 2.0);

    let v = waypoints[i].velocity;
    let drag = v * (physics.drag_coeff * v.magnitude() / (2.0 * physics.mass));
    let velocity_residual = numerical_acceleration + drag + gravity_vector(physics);

    Residual {
        position: position_residual,
        velocity: velocity_residual,
    }
}

fn boundary_error(optimized: &[Waypoint], original: &[Waypoint]) -> f64 {
    let first = optimized[0].position.range_to(&original[0].position);
    let last = optimized[optimized.len() - 1]
        .position
        .range_to(&original[original.len() - 1].position);
    first + last
}

/// Result of running the optimizer to convergence or exhausting its round
/// budget.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub waypoints: Vec<Waypoint>,
    pub converged: bool,
    pub history: Vec<LossRecord>,
}

/// Iteratively reduce residuals and boundary error for at most
/// `max_rounds` rounds. Endpoints are never moved.
pub fn optimize(
    waypoints: &[Waypoint],
    physics: &PhysicsModel,
    min_altitude: f64,
    max_altitude: f64,
    learning_rate: f64,
    max_rounds: usize,
    tolerance: f64,
) -> Result<OptimizationResult, PhysicsError> {
    if waypoints.len() < 2 {
        return Err(PhysicsError::TooFewWaypoints);
    }

    let original = waypoints.to_vec();
    let mut current = waypoints.to_vec();
    let mut weights = AdaptiveWeights::default();
    let mut history = Vec::with_capacity(max_rounds);
    let mut converged = false;

    if current.len() < 3 {
        return Ok(OptimizationResult {
            waypoints: current,
            converged: true,
            history,
        });
    }

    for iteration in 0..max_rounds {
        let residuals: Vec<Residual> = (1..current.len() - 1)
            .map(|i| compute_residual(&current, i, physics))
            .collect();

        let data_loss: f64 = residuals.iter().map(|r| r.position.magnitude()).sum();
        let physics_loss: f64 = residuals.iter().map(|r| r.velocity.magnitude()).sum();
        let boundary_loss = boundary_error(&current, &original);
        let total_loss = data_loss + physics_loss + boundary_loss;

        let record = LossRecord {
            data_loss,
            physics_loss,
            boundary_loss,
            total_loss,
            iteration,
        };
        history.push(record);

        if data_loss + physics_loss < tolerance && boundary_loss < tolerance {
            converged = true;
            debug!(iteration, total_loss, "optimize: residuals converged");
            break;
        }

        for (offset, residual) in residuals.iter().enumerate() {
            let i = offset + 1;
            let correction = residual.position * (-learning_rate * weights.physics);
            current[i].position = current[i].position + correction;
            current[i].position.z = current[i].position.z.clamp(min_altitude, max_altitude);
        }

        for i in 1..current.len() - 1 {
            let dt = safe_dt(current[i + 1].timestamp.seconds_since(current[i - 1].timestamp));
            current[i].velocity = (current[i + 1].position - current[i - 1].position) / dt;
        }

        weights.update(&record);
    }

    Ok(OptimizationResult {
        waypoints: current,
        converged,
        history,
    })
}
