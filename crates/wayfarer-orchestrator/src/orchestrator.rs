//! The planner orchestrator (component C7): drives the full candidate
//! generation -> physics refinement -> scoring -> stealth -> adaptation
//! pipeline over the crates built below it, owns all shared mutable
//! state, and exposes `plan`/`update`/`validate` as its public surface.
//!
//! One struct owning every piece of shared state behind the narrowest
//! lock that covers it, with a single ordered pipeline method as the
//! entry point and small accessor methods alongside it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Instant as WallClock;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use wayfarer_core::config::PlannerConfig;
use wayfarer_core::constants::{EXPERIENCE_BUFFER_CAPACITY, MODEL_VERSION, SPEED_TOLERANCE_FACTOR};
use wayfarer_core::enums::{AlertLevel, PayloadClass, Priority, StealthMode};
use wayfarer_core::error::PlannerError;
use wayfarer_core::experience::{ExperienceBuffer, ExperienceEntry};
use wayfarer_core::profiles::{PayloadProfile, PayloadProfileRegistry};
use wayfarer_core::request::{PlanRequest, StateUpdate};
use wayfarer_core::threat::{EvasionStrategyTable, ThreatLocation};
use wayfarer_core::types::{Instant, Trajectory, TrajectoryId};

use wayfarer_agents::{Agent, AgentPool};

use crate::capability::{NoopStealth, StealthCapability};
use crate::cancellation::CancellationToken;
use crate::{metrics, rule_based};

/// A stored plan keeps the original request alongside the trajectory so
/// `update` can recover the target, payload class, and threat list it was
/// built from.
struct StoredPlan {
    trajectory: Trajectory,
    request: PlanRequest,
}

/// One candidate still in flight: its waypoints, whether the physics
/// optimizer converged on it (rule-based candidates never diverge, so
/// they carry `true`), and an optional confidence override carried over
/// from generation (set for the consensus candidate, `None` otherwise).
struct Candidate {
    waypoints: Vec<wayfarer_core::types::Waypoint>,
    converged: bool,
    confidence_override: Option<f64>,
}

pub struct PlannerOrchestrator {
    registry: PayloadProfileRegistry,
    config: PlannerConfig,
    pool: RwLock<AgentPool>,
    trajectories: RwLock<HashMap<TrajectoryId, StoredPlan>>,
    threats: RwLock<HashMap<String, ThreatLocation>>,
    alert_level: RwLock<AlertLevel>,
    experience: Mutex<ExperienceBuffer>,
    strategies: EvasionStrategyTable,
    stealth: Box<dyn StealthCapability>,
    next_id: AtomicU64,
    next_seed: AtomicU64,
}

impl PlannerOrchestrator {
    /// Construct the orchestrator. Fails if the agent pool is empty — an
    /// engine-level, fatal-at-construction condition.
    pub fn new(
        agents: Vec<Agent>,
        config: PlannerConfig,
        stealth: Option<Box<dyn StealthCapability>>,
    ) -> Result<Self, PlannerError> {
        let pool = AgentPool::new(agents, config.consensus_weight)
            .map_err(|err| PlannerError::OptimizationFailed(err.to_string()))?;
        Ok(Self {
            registry: PayloadProfileRegistry::new(),
            config,
            pool: RwLock::new(pool),
            trajectories: RwLock::new(HashMap::new()),
            threats: RwLock::new(HashMap::new()),
            alert_level: RwLock::new(AlertLevel::Normal),
            experience: Mutex::new(ExperienceBuffer::new(EXPERIENCE_BUFFER_CAPACITY)),
            strategies: EvasionStrategyTable::new(),
            stealth: stealth.unwrap_or_else(|| Box::new(NoopStealth)),
            next_id: AtomicU64::new(1),
            next_seed: AtomicU64::new(1),
        })
    }

    pub fn model_version(&self) -> &'static str {
        MODEL_VERSION
    }

    pub fn alert_level(&self) -> AlertLevel {
        *self.alert_level.read().expect("alert level lock poisoned")
    }

    pub fn profile(&self, class: PayloadClass) -> Result<PayloadProfile, PlannerError> {
        self.registry.get(class).cloned()
    }

    /// Fold accumulated experience into the agent pool's exploration rates.
    /// Takes the pool's exclusive lock, per §5's "mutated only by
    /// `train_from_experience`" rule; policy/value weights themselves are
    /// never touched here.
    pub fn train_from_experience(&self) {
        let buffer = self.experience.lock().expect("experience buffer lock poisoned");
        let mut pool = self.pool.write().expect("agent pool lock poisoned");
        pool.train_from_experience(&buffer, &self.config);
    }

    /// Register a threat under its deterministic id, overwriting any
    /// existing entry at the same cell.
    pub fn register_threat(&self, threat: ThreatLocation) {
        self.threats
            .write()
            .expect("threat registry lock poisoned")
            .insert(threat.derived_id(), threat);
    }

    /// Clear a threat by its deterministic id. A no-op if it isn't present.
    pub fn clear_threat(&self, id: &str) {
        self.threats
            .write()
            .expect("threat registry lock poisoned")
            .remove(id);
    }

    fn all_threats(&self, request_threats: &[ThreatLocation]) -> Vec<ThreatLocation> {
        let mut combined: Vec<ThreatLocation> = self
            .threats
            .read()
            .expect("threat registry lock poisoned")
            .values()
            .copied()
            .collect();
        combined.extend_from_slice(request_threats);
        combined
    }

    fn elapsed_exceeds(&self, started: WallClock, request: &PlanRequest) -> bool {
        request.is_overdue(started.elapsed().as_secs_f64())
    }

    /// Run the full pipeline with no cancellation support.
    pub fn plan(&self, request: &PlanRequest) -> Result<Trajectory, PlannerError> {
        self.plan_with_cancellation(request, &CancellationToken::new())
    }

    /// Run the full pipeline, honoring `cancel` at stage boundaries. A
    /// cancellation raised before the commit step fails the same way a
    /// deadline overrun does: no trajectory is stored.
    pub fn plan_with_cancellation(
        &self,
        request: &PlanRequest,
        cancel: &CancellationToken,
    ) -> Result<Trajectory, PlannerError> {
        let started = WallClock::now();

        // 1. profile lookup
        let profile = self.registry.get(request.payload_class)?.clone();
        debug!(?request.payload_class, "plan: profile resolved");

        // 2. alert level from the union of registered and request threats
        let threats = self.all_threats(&request.constraints.threats);
        let level = wayfarer_threat::evaluate(&threats);
        {
            let mut guard = self.alert_level.write().expect("alert level lock poisoned");
            if *guard != level {
                info!(from = ?*guard, to = ?level, "alert level transition");
            }
            *guard = level;
        }

        if self.elapsed_exceeds(started, request) || cancel.is_cancelled() {
            return Err(self.timeout(request, started));
        }

        // 3. K_marl MARL candidates (+ consensus, folded in by generate_candidates)
        let seed = self.next_seed.fetch_add(1, Ordering::Relaxed);
        let raw_candidates = {
            let pool_guard = self.pool.read().expect("agent pool lock poisoned");
            wayfarer_agents::generate_candidates(&pool_guard, request, &profile, &self.config, seed, cancel)
        };
        debug!(count = raw_candidates.len(), "plan: marl candidates generated");

        if self.elapsed_exceeds(started, request) || cancel.is_cancelled() {
            return Err(self.timeout(request, started));
        }

        // 4. physics optimizer pass; drop failures
        let mut candidates: Vec<Candidate> = Vec::with_capacity(raw_candidates.len() + self.config.k_rule);
        for raw in &raw_candidates {
            match wayfarer_physics::optimize(
                &raw.waypoints,
                &profile.physics,
                profile.min_altitude,
                profile.max_altitude,
                self.config.learning_rate,
                self.config.max_optimizer_rounds,
                self.config.convergence_tolerance,
            ) {
                Ok(result) => candidates.push(Candidate {
                    waypoints: result.waypoints,
                    converged: result.converged,
                    confidence_override: raw.confidence_override,
                }),
                Err(err) => warn!(%err, "plan: dropping candidate, physics optimization failed"),
            }
        }

        // 5. rule-based candidates
        for waypoints in rule_based::generate(request, &profile, self.config.k_rule) {
            candidates.push(Candidate {
                waypoints,
                converged: true,
                confidence_override: None,
            });
        }

        if candidates.is_empty() {
            return Err(PlannerError::PlanUnavailable(None));
        }

        if self.elapsed_exceeds(started, request) || cancel.is_cancelled() {
            return Err(self.timeout(request, started));
        }

        // 6. score, Pareto front, select by priority
        let trajectories: Vec<Trajectory> = candidates
            .iter()
            .map(|c| {
                metrics::build_trajectory(
                    TrajectoryId(0),
                    c.waypoints.clone(),
                    request.payload_class,
                    &threats,
                    &profile,
                    Instant::now(),
                )
            })
            .collect();
        let scores: Vec<_> = trajectories.iter().map(|t| wayfarer_scoring::score(t, &profile)).collect();
        let front_indices = wayfarer_scoring::pareto_front(&scores);
        let front_scores: Vec<_> = front_indices.iter().map(|&i| scores[i]).collect();
        let selected_in_front = wayfarer_scoring::select(&front_scores, request.priority)
            .ok_or(PlannerError::PlanUnavailable(None))?;
        let chosen_index = front_indices[selected_in_front];
        let mut trajectory = trajectories[chosen_index].clone();
        let physics_converged = candidates[chosen_index].converged;
        let confidence_base = candidates[chosen_index]
            .confidence_override
            .unwrap_or(metrics::BASELINE_CONFIDENCE);

        // 7. stealth collaborator
        if request.stealth_mode != StealthMode::None {
            match self.stealth.optimize(&trajectory, request.stealth_mode) {
                Ok(refined) => trajectory = refined,
                Err(err) => warn!(err = %err, "plan: stealth capability failed, keeping unrefined trajectory"),
            }
        }

        // 8. threat adaptation
        let adaptation_confidence = if self.alert_level() != AlertLevel::Normal {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(31));
            let (adapted, confidence) =
                wayfarer_threat::adapt(&trajectory.waypoints, &threats, &self.strategies, &mut rng)?;
            trajectory.waypoints = adapted;
            confidence
        } else {
            1.0
        };

        // recompute derived metrics now that stealth/adaptation may have
        // mutated the waypoint list
        trajectory.total_distance = Trajectory::compute_total_distance(&trajectory.waypoints);
        trajectory.estimated_time = Trajectory::compute_estimated_time(&trajectory.waypoints);
        trajectory.threat_exposure = metrics::compute_threat_exposure(&trajectory.waypoints, &threats);
        trajectory.stealth_score = metrics::compute_stealth_score(&trajectory.waypoints, &profile, &threats);
        trajectory.fuel_required = metrics::compute_fuel_required(&trajectory.waypoints, &profile);
        trajectory.confidence =
            metrics::compose_confidence(confidence_base, physics_converged, adaptation_confidence);
        trajectory.id = TrajectoryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        trajectory.created_at = Instant::now();

        self.validate(&trajectory)?;

        if self.elapsed_exceeds(started, request) || cancel.is_cancelled() {
            return Err(self.timeout(request, started));
        }

        // 9. commit: store + experience entry
        {
            let mut store = self.trajectories.write().expect("trajectory store lock poisoned");
            store.insert(
                trajectory.id,
                StoredPlan {
                    trajectory: trajectory.clone(),
                    request: request.clone(),
                },
            );
        }
        {
            let mut buffer = self.experience.lock().expect("experience buffer lock poisoned");
            buffer.push(ExperienceEntry::new(
                trajectory.id,
                request.payload_class,
                trajectory.confidence,
                trajectory.created_at,
            ));
        }
        debug!(trajectory_id = trajectory.id.0, "plan: committed");

        // 10. return
        Ok(trajectory)
    }

    fn timeout(&self, request: &PlanRequest, started: WallClock) -> PlannerError {
        PlannerError::Timeout {
            class: request.payload_class,
            elapsed_secs: started.elapsed().as_secs_f64(),
        }
    }

    /// Locate the stored trajectory's nearest waypoint to `state`'s
    /// position; rebuild the plan if the deviation exceeds the configured
    /// threshold, otherwise re-run adaptation if the alert level warrants
    /// it, otherwise return the trajectory unchanged.
    pub fn update(&self, state: &StateUpdate) -> Result<Trajectory, PlannerError> {
        let stored = {
            let store = self.trajectories.read().expect("trajectory store lock poisoned");
            store
                .get(&state.trajectory_id)
                .map(|plan| (plan.trajectory.clone(), plan.request.clone()))
        };
        let (trajectory, request) = stored.ok_or(PlannerError::PlanUnavailable(Some(state.trajectory_id)))?;

        let nearest = trajectory
            .waypoints
            .iter()
            .map(|w| w.position.range_to(&state.current_position))
            .fold(f64::INFINITY, f64::min);

        if nearest > self.config.deviation_threshold {
            let mut replan_request = request;
            replan_request.start = state.current_position;
            replan_request.priority = Priority::High;
            replan_request.stealth_mode = StealthMode::Medium;
            return self.plan(&replan_request);
        }

        if self.alert_level() != AlertLevel::Normal {
            let threats = self.all_threats(&request.constraints.threats);
            let seed = self.next_seed.fetch_add(1, Ordering::Relaxed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (adapted, confidence) =
                wayfarer_threat::adapt(&trajectory.waypoints, &threats, &self.strategies, &mut rng)?;
            let mut updated = trajectory;
            updated.waypoints = adapted;
            updated.confidence = (updated.confidence * confidence).clamp(0.0, 1.0);
            updated.total_distance = Trajectory::compute_total_distance(&updated.waypoints);
            updated.estimated_time = Trajectory::compute_estimated_time(&updated.waypoints);
            return Ok(updated);
        }

        Ok(trajectory)
    }

    /// Enforce: at least 2 waypoints, strictly increasing timestamps,
    /// speed within `SPEED_TOLERANCE_FACTOR` of the looser of the
    /// profile's or waypoint's declared bound, altitude within the looser
    /// of the two altitude envelopes. Fails on the first violation.
    pub fn validate(&self, trajectory: &Trajectory) -> Result<(), PlannerError> {
        if trajectory.waypoints.len() < 2 {
            return Err(PlannerError::InvalidTrajectory {
                index: 0,
                reason: "fewer than 2 waypoints".to_string(),
            });
        }

        let profile = self.registry.get(trajectory.payload_class)?;

        for (index, waypoint) in trajectory.waypoints.iter().enumerate() {
            if index > 0 && waypoint.timestamp <= trajectory.waypoints[index - 1].timestamp {
                return Err(PlannerError::InvalidTrajectory {
                    index,
                    reason: "timestamp does not strictly increase".to_string(),
                });
            }

            let speed_limit = waypoint.constraints.max_speed.max(profile.max_speed) * SPEED_TOLERANCE_FACTOR;
            let speed = waypoint.velocity.magnitude();
            if speed > speed_limit {
                return Err(PlannerError::InvalidTrajectory {
                    index,
                    reason: format!("speed {speed:.2} exceeds tolerance {speed_limit:.2}"),
                });
            }

            let min_altitude = waypoint.constraints.min_altitude.min(profile.min_altitude);
            let max_altitude = waypoint.constraints.max_altitude.max(profile.max_altitude);
            let altitude = waypoint.position.z;
            if altitude < min_altitude || altitude > max_altitude {
                return Err(PlannerError::InvalidTrajectory {
                    index,
                    reason: format!("altitude {altitude:.2} outside [{min_altitude:.2}, {max_altitude:.2}]"),
                });
            }
        }

        Ok(())
    }
}
