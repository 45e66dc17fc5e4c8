//! The agent pool (component C3): a fixed roster of specialized agents,
//! each running an independent policy rollout, reaching consensus, and
//! padding out to the requested candidate count with exploration
//! trajectories.
//!
//! Parallelism is plain `std::thread::scope`, not async — rollouts share
//! no mutable state and each can simply run to completion on its own
//! thread.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use wayfarer_core::cancellation::CancellationToken;
use wayfarer_core::config::PlannerConfig;
use wayfarer_core::enums::AgentSpecialization;
use wayfarer_core::experience::ExperienceBuffer;
use wayfarer_core::profiles::PayloadProfile;
use wayfarer_core::request::PlanRequest;
use wayfarer_core::types::{Instant, Vector3, Waypoint, WaypointConstraints};
use wayfarer_policy::{encode_state, evaluate, PolicyNetwork, StateFeatures};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("rollout produced an empty or single-point trajectory")]
    EmptyTrajectory,

    #[error("rollout cancelled before reaching a usable trajectory")]
    Cancelled,
}

/// One generated candidate, tagged with the confidence the orchestrator
/// should apply if this is the one selected. `None` means "use the
/// pipeline's baseline"; `Some(weight)` marks the consensus candidate,
/// whose confidence is the consensus weight rather than the baseline.
#[derive(Debug, Clone)]
pub struct GeneratedCandidate {
    pub waypoints: Vec<Waypoint>,
    pub confidence_override: Option<f64>,
}

#[derive(Debug, Error)]
pub enum AgentPoolError {
    #[error("agent pool must be constructed with at least one agent")]
    Empty,
}

/// One specialized agent: a policy network, a value network, and the
/// exploration/reward state `train_from_experience` mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    pub specialization: AgentSpecialization,
    pub policy: PolicyNetwork,
    pub value: PolicyNetwork,
    pub exploration_rate: f64,
    pub accumulated_reward: f64,
}

/// Holds the fixed agent roster and the scalar weight given to consensus
/// agreement when a consensus trajectory is folded into the candidate set.
#[derive(Debug, Clone)]
pub struct AgentPool {
    agents: Vec<Agent>,
    consensus_weight: f64,
}

impl AgentPool {
    pub fn new(agents: Vec<Agent>, consensus_weight: f64) -> Result<Self, AgentPoolError> {
        if agents.is_empty() {
            return Err(AgentPoolError::Empty);
        }
        Ok(Self {
            agents,
            consensus_weight,
        })
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Fold recent experience into every agent's exploration rate. Weights
    /// themselves are never touched — training the policies is out of
    /// scope, only the accumulated-reward bookkeeping is implemented.
    pub fn train_from_experience(&mut self, buffer: &ExperienceBuffer, config: &PlannerConfig) {
        if buffer.is_empty() {
            return;
        }
        let mean_reward: f64 =
            buffer.iter().map(|e| e.reward).sum::<f64>() / buffer.len() as f64;
        for agent in self.agents.iter_mut() {
            agent.accumulated_reward += mean_reward;
            if mean_reward > 0.0 {
                agent.exploration_rate =
                    (agent.exploration_rate * (1.0 - config.learning_rate)).max(0.0);
            } else {
                agent.exploration_rate =
                    (agent.exploration_rate * (1.0 + config.learning_rate)).min(1.0);
            }
        }
    }
}

fn build_constraints(profile: &PayloadProfile, stealth_required: bool) -> WaypointConstraints {
    WaypointConstraints {
        max_speed: profile.max_speed,
        max_acceleration: profile.max_acceleration,
        min_altitude: profile.min_altitude,
        max_altitude: profile.max_altitude,
        stealth_required,
    }
}

fn speed_floor(profile: &PayloadProfile) -> f64 {
    if profile.min_speed > 0.0 {
        profile.min_speed
    } else {
        wayfarer_core::constants::DEFAULT_MIN_SPEED_FLOOR
    }
}

/// One 1-second Euler integration step.
fn integrate_step(
    position: Vector3,
    velocity: Vector3,
    action: &wayfarer_policy::ActionVector,
    profile: &PayloadProfile,
    dt: f64,
) -> (Vector3, Vector3) {
    let floor = speed_floor(profile);
    let s = velocity.magnitude().max(floor).max(wayfarer_core::constants::MIN_SPEED_CLAMP);
    let heading = velocity.y.atan2(velocity.x) + action.delta_heading;
    let pitch = action.delta_pitch;
    let target_speed = (s * (0.5 + 0.5 * action.thrust_level)).clamp(profile.min_speed, profile.max_speed);
    let new_velocity = Vector3::new(
        target_speed * heading.cos() * pitch.cos(),
        target_speed * heading.sin() * pitch.cos(),
        target_speed * pitch.sin(),
    );
    let mut new_position = position + new_velocity * dt + Vector3::new(0.0, 0.0, action.altitude_change);
    new_position.z = new_position.z.clamp(profile.min_altitude, profile.max_altitude);
    (new_position, new_velocity)
}

/// Run one agent's rollout from the request's start toward its target.
/// Returns the ordered waypoint list, or `AgentError` if the result is
/// degenerate (the caller drops such a rollout silently and proceeds
/// with whatever else produced a usable candidate). Polls `cancel` at
/// each step boundary and bails out with `AgentError::Cancelled` if it's
/// raised before the rollout reaches the target.
pub fn rollout(
    agent: &Agent,
    request: &PlanRequest,
    profile: &PayloadProfile,
    config: &PlannerConfig,
    rng: &mut ChaCha8Rng,
    cancel: &CancellationToken,
) -> Result<Vec<Waypoint>, AgentError> {
    let constraints = build_constraints(profile, request.constraints.stealth_required);
    let mut position = request.start;
    let mut velocity = Vector3::ZERO;
    let mut timestamp = Instant::from_secs_f64(0.0);

    let mut waypoints = vec![Waypoint {
        position,
        velocity,
        timestamp,
        constraints,
    }];

    for step in 0..config.max_rollout_steps {
        if cancel.is_cancelled() {
            trace!(agent = agent.id, step, "rollout: cancelled at step boundary");
            return Err(AgentError::Cancelled);
        }

        let features = StateFeatures {
            position,
            velocity,
            target_distance: position.range_to(&request.target),
            threat_proximity: nearest_threat_proximity(&request.constraints.threats, position),
            fuel_remaining: 1.0 - step as f64 / config.max_rollout_steps as f64,
            time_remaining: 1.0 - step as f64 / config.max_rollout_steps as f64,
            stealth_score: profile.stealth_capability,
        };
        let state = encode_state(&features, agent.policy.input_size());
        let action = evaluate(&agent.policy, &state, agent.exploration_rate, rng);

        let (new_position, new_velocity) =
            integrate_step(position, velocity, &action, profile, wayfarer_core::constants::ROLLOUT_DT);
        position = new_position;
        velocity = new_velocity;
        timestamp = timestamp.plus_secs(wayfarer_core::constants::ROLLOUT_DT);

        waypoints.push(Waypoint {
            position,
            velocity,
            timestamp,
            constraints,
        });

        if position.range_to(&request.target) < wayfarer_core::constants::TAU_TARGET {
            trace!(agent = agent.id, step, "rollout: within target radius, stopping");
            break;
        }
    }

    if position.range_to(&request.target) >= wayfarer_core::constants::TAU_TARGET {
        debug!(agent = agent.id, "rollout: step budget exhausted, snapping final waypoint to target");
        timestamp = timestamp.plus_secs(wayfarer_core::constants::ROLLOUT_DT);
        waypoints.push(Waypoint {
            position: request.target,
            velocity: Vector3::ZERO,
            timestamp,
            constraints,
        });
    }

    if waypoints.len() < 2 {
        return Err(AgentError::EmptyTrajectory);
    }
    Ok(waypoints)
}

fn nearest_threat_proximity(
    threats: &[wayfarer_core::threat::ThreatLocation],
    position: Vector3,
) -> f64 {
    threats
        .iter()
        .map(|t| position.range_to(&t.position) / t.effect_radius.max(1.0))
        .fold(f64::INFINITY, f64::min)
        .min(1.0)
        .max(0.0)
}

/// Resample `waypoints` to exactly `m` points by linear interpolation
/// between the two source waypoints each target index falls between.
pub fn interpolate(waypoints: &[Waypoint], m: usize) -> Vec<Waypoint> {
    let n = waypoints.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }
    if m == 1 || n == 1 {
        return vec![waypoints[0]; m];
    }
    (0..m)
        .map(|i| {
            let t = i as f64 / (m - 1) as f64;
            let src = t * (n - 1) as f64;
            let low = src.floor() as usize;
            let frac = src - low as f64;
            let high = (low + 1).min(n - 1);
            let a = &waypoints[low];
            let b = &waypoints[high];
            Waypoint {
                position: lerp_vec(a.position, b.position, frac),
                velocity: lerp_vec(a.velocity, b.velocity, frac),
                timestamp: Instant::from_secs_f64(lerp_f64(
                    a.timestamp.as_secs_f64(),
                    b.timestamp.as_secs_f64(),
                    frac,
                )),
                constraints: a.constraints,
            }
        })
        .collect()
}

fn lerp_vec(a: Vector3, b: Vector3, t: f64) -> Vector3 {
    a + (b - a) * t
}

fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
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
        let v = (waypoints[i + 1].position - waypoints[i].position) / dt;
        waypoints[i].velocity = v;
    }
    waypoints[n - 1].velocity = waypoints[n - 2].velocity;
}

/// Fold a set of per-agent proposals into one consensus trajectory: resample
/// each to the median waypoint count, then average positions at each index.
/// Equal weighting across agents — no per-agent confidence is part of the
/// data model, so the "confidence-weighted average" collapses to a mean.
pub fn consensus(proposals: &[Vec<Waypoint>]) -> Option<Vec<Waypoint>> {
    if proposals.is_empty() {
        return None;
    }
    let mut counts: Vec<usize> = proposals.iter().map(|p| p.len()).collect();
    counts.sort_unstable();
    let median = counts[counts.len() / 2];

    let resampled: Vec<Vec<Waypoint>> = proposals
        .iter()
        .map(|p| interpolate(p, median))
        .collect();

    let mut merged = Vec::with_capacity(median);
    for i in 0..median {
        let mut sum = Vector3::ZERO;
        let mut t_sum = 0.0;
        let constraints = resampled[0][i].constraints;
        for proposal in &resampled {
            sum = sum + proposal[i].position;
            t_sum += proposal[i].timestamp.as_secs_f64();
        }
        let count = resampled.len() as f64;
        merged.push(Waypoint {
            position: sum / count,
            velocity: Vector3::ZERO,
            timestamp: Instant::from_secs_f64(t_sum / count),
            constraints,
        });
    }
    back_compute_velocities(&mut merged);
    Some(merged)
}

/// Produce a random-walk candidate for padding out a sparse candidate set.
pub fn exploration_trajectory(
    request: &PlanRequest,
    profile: &PayloadProfile,
    rng: &mut ChaCha8Rng,
) -> Vec<Waypoint> {
    let constraints = build_constraints(profile, request.constraints.stealth_required);
    let num_steps = rng.gen_range(5..=15);
    let mut waypoints = Vec::with_capacity(num_steps + 1);
    for i in 0..=num_steps {
        let progress = i as f64 / num_steps as f64;
        let base = lerp_vec(request.start, request.target, progress);
        let xy_mag = 1000.0 * (1.0 - progress);
        let z_mag = xy_mag / 10.0;
        let perturbed = if i == 0 {
            request.start
        } else if i == num_steps {
            request.target
        } else {
            let mut p = Vector3::new(
                base.x + rng.gen_range(-xy_mag..=xy_mag),
                base.y + rng.gen_range(-xy_mag..=xy_mag),
                base.z + rng.gen_range(-z_mag..=z_mag),
            );
            p.z = p.z.clamp(profile.min_altitude, profile.max_altitude);
            p
        };
        waypoints.push(Waypoint {
            position: perturbed,
            velocity: Vector3::ZERO,
            timestamp: Instant::from_secs_f64(i as f64 * wayfarer_core::constants::ROLLOUT_DT),
            constraints,
        });
    }
    back_compute_velocities(&mut waypoints);
    waypoints
}

/// Run every agent's rollout in parallel, fold in a consensus trajectory,
/// and pad the set to `config.k_marl` with exploration trajectories. Always
/// returns at least one candidate. `cancel` is passed through to every
/// rollout thread so a mid-flight cancellation drops those candidates
/// rather than waiting out their full step budget.
pub fn generate_candidates(
    pool: &AgentPool,
    request: &PlanRequest,
    profile: &PayloadProfile,
    config: &PlannerConfig,
    seed: u64,
    cancel: &CancellationToken,
) -> Vec<GeneratedCandidate> {
    let rollouts: Vec<Option<Vec<Waypoint>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = pool
            .agents()
            .iter()
            .enumerate()
            .map(|(i, agent)| {
                let seed_i = seed.wrapping_add(i as u64 + 1);
                scope.spawn(move || {
                    let mut rng = ChaCha8Rng::seed_from_u64(seed_i);
                    rollout(agent, request, profile, config, &mut rng, cancel).ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(None))
            .collect()
    });

    let mut candidates: Vec<Vec<Waypoint>> = rollouts.into_iter().flatten().collect();

    let consensus_trajectory = consensus(&candidates);

    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(9_973));
    while candidates.len() < config.k_marl {
        candidates.push(exploration_trajectory(request, profile, &mut rng));
    }
    debug!(candidates = candidates.len(), "generate_candidates: pool topped up to k_marl");

    let mut tagged: Vec<GeneratedCandidate> = candidates
        .into_iter()
        .map(|waypoints| GeneratedCandidate {
            waypoints,
            confidence_override: None,
        })
        .collect();

    if let Some(waypoints) = consensus_trajectory {
        tagged.push(GeneratedCandidate {
            waypoints,
            confidence_override: Some(pool.consensus_weight),
        });
    }

    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::enums::{PayloadClass, Priority, StealthMode};
    use wayfarer_core::profiles::PayloadProfileRegistry;
    use wayfarer_core::request::PlanConstraints;
    use wayfarer_policy::Layer;

    fn linear_identity_policy(size: usize) -> PolicyNetwork {
        let weights: Vec<Vec<f64>> = (0..size)
            .map(|i| {
                let mut row = vec![0.0; size];
                row[i] = 0.1;
                row
            })
            .collect();
        let layer = Layer {
            weights,
            biases: vec![0.0; size],
        };
        PolicyNetwork::new(size, vec![layer]).unwrap()
    }

    fn test_agent(id: u32, specialization: AgentSpecialization) -> Agent {
        Agent {
            id,
            specialization,
            policy: linear_identity_policy(11),
            value: linear_identity_policy(11),
            exploration_rate: 0.0,
            accumulated_reward: 0.0,
        }
    }

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
    fn rollout_reaches_near_target() {
        let (request, profile) = uav_request();
        let config = PlannerConfig::default();
        let agent = test_agent(0, AgentSpecialization::Speed);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cancel = CancellationToken::new();
        let waypoints = rollout(&agent, &request, &profile, &config, &mut rng, &cancel).unwrap();
        assert!(waypoints.len() >= 2);
        let last = waypoints.last().unwrap();
        assert!(last.position.range_to(&request.target) <= wayfarer_core::constants::TAU_TARGET + 1.0);
    }

    #[test]
    fn rollout_honors_a_pre_cancelled_token() {
        let (request, profile) = uav_request();
        let config = PlannerConfig::default();
        let agent = test_agent(0, AgentSpecialization::Speed);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(matches!(
            rollout(&agent, &request, &profile, &config, &mut rng, &cancel),
            Err(AgentError::Cancelled)
        ));
    }

    #[test]
    fn pool_always_returns_at_least_one_candidate() {
        let (request, profile) = uav_request();
        let config = PlannerConfig::default();
        let agents = vec![test_agent(0, AgentSpecialization::Stealth)];
        let pool = AgentPool::new(agents, 0.3).unwrap();
        let cancel = CancellationToken::new();
        let candidates = generate_candidates(&pool, &request, &profile, &config, 1, &cancel);
        assert!(!candidates.is_empty());
        assert!(candidates.len() >= config.k_marl);
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(matches!(AgentPool::new(vec![], 0.3), Err(AgentPoolError::Empty)));
    }

    #[test]
    fn interpolate_preserves_endpoints() {
        let (request, profile) = uav_request();
        let config = PlannerConfig::default();
        let agent = test_agent(0, AgentSpecialization::MultiDomain);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cancel = CancellationToken::new();
        let waypoints = rollout(&agent, &request, &profile, &config, &mut rng, &cancel).unwrap();
        let resampled = interpolate(&waypoints, 5);
        assert_eq!(resampled.len(), 5);
        assert_eq!(resampled[0].position, waypoints[0].position);
    }

    #[test]
    fn exploration_trajectory_pins_both_endpoints() {
        let (request, profile) = uav_request();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let waypoints = exploration_trajectory(&request, &profile, &mut rng);
        assert_eq!(waypoints[0].position, request.start);
        assert_eq!(waypoints.last().unwrap().position, request.target);
    }

    #[test]
    fn train_from_experience_decays_exploration_on_positive_reward() {
        let mut pool = AgentPool::new(
            vec![Agent {
                exploration_rate: 0.5,
                ..test_agent(0, AgentSpecialization::Fuel)
            }],
            0.3,
        )
        .unwrap();
        let mut buffer = ExperienceBuffer::new(10);
        buffer.push(wayfarer_core::experience::ExperienceEntry::new(
            wayfarer_core::types::TrajectoryId(1),
            PayloadClass::Uav,
            1.0,
            Instant::from_secs_f64(0.0),
        ));
        let config = PlannerConfig::default();
        pool.train_from_experience(&buffer, &config);
        assert!(pool.agents()[0].exploration_rate < 0.5);
    }
}
