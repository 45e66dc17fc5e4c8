//! Feed-forward policy/value network evaluation (component C2).
//!
//! A network is a fixed-topology stack of dense layers: declared input
//! size, ordered hidden widths, and an output size. Hidden layers are
//! `tanh(W·x + b)`; the output layer is linear. `PolicyNetwork::new`
//! validates that every layer's weight matrix agrees with its declared
//! input/output width — dimension mismatches are rejected at
//! construction, not discovered mid-rollout.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a network's declared topology doesn't match the shape of
/// the weight matrices it was constructed with.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("layer {layer} expects {expected} inputs, got {actual}")]
    DimensionMismatch {
        layer: usize,
        expected: usize,
        actual: usize,
    },
    #[error("network must have at least one layer")]
    Empty,
}

/// One dense layer: `weights[out][in]`, `biases[out]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl Layer {
    pub fn input_size(&self) -> usize {
        self.weights.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn output_size(&self) -> usize {
        self.weights.len()
    }
}

/// A validated feed-forward stack: hidden layers (tanh) followed by one
/// linear output layer. Used for both the policy and the value network —
/// they share the same topology, just different output widths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyNetwork {
    input_size: usize,
    layers: Vec<Layer>,
}

impl PolicyNetwork {
    /// Validate layer shapes against each other and the declared input
    /// size; reject anything inconsistent rather than evaluate garbage.
    pub fn new(input_size: usize, layers: Vec<Layer>) -> Result<Self, PolicyError> {
        if layers.is_empty() {
            return Err(PolicyError::Empty);
        }
        let mut expected = input_size;
        for (i, layer) in layers.iter().enumerate() {
            let actual = layer.input_size();
            if actual != expected {
                return Err(PolicyError::DimensionMismatch {
                    layer: i,
                    expected,
                    actual,
                });
            }
            if layer.weights.len() != layer.biases.len() {
                return Err(PolicyError::DimensionMismatch {
                    layer: i,
                    expected: layer.weights.len(),
                    actual: layer.biases.len(),
                });
            }
            expected = layer.output_size();
        }
        Ok(Self { input_size, layers })
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map(|l| l.output_size()).unwrap_or(0)
    }

    /// Pad/truncate to `input_size`, run every hidden layer through tanh,
    /// leave the last layer linear.
    fn forward(&self, input: &[f64]) -> Vec<f64> {
        let mut x = fit_to_length(input, self.input_size);
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            let mut y = vec![0.0; layer.output_size()];
            for (row_idx, row) in layer.weights.iter().enumerate() {
                let mut acc = layer.biases[row_idx];
                for (w, xi) in row.iter().zip(x.iter()) {
                    acc += w * xi;
                }
                y[row_idx] = if i == last { acc } else { acc.tanh() };
            }
            x = y;
        }
        x
    }
}

fn fit_to_length(input: &[f64], len: usize) -> Vec<f64> {
    let mut v = input.to_vec();
    v.resize(len, 0.0);
    v
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The planner-meaningful action a raw network output vector maps to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionVector {
    pub delta_heading: f64,
    pub delta_pitch: f64,
    pub thrust_level: f64,
    pub altitude_change: f64,
    pub waypoint_skip: u32,
    pub stealth_activate: bool,
}

impl ActionVector {
    /// Map a raw (possibly exploration-perturbed) output vector to the
    /// fixed six-slot action schema. Missing trailing slots default to
    /// zero/false.
    fn from_raw(raw: &[f64]) -> Self {
        let at = |i: usize| raw.get(i).copied().unwrap_or(0.0);
        Self {
            delta_heading: (at(0) * std::f64::consts::FRAC_PI_4)
                .clamp(-std::f64::consts::FRAC_PI_4, std::f64::consts::FRAC_PI_4),
            delta_pitch: at(1) * std::f64::consts::FRAC_PI_8,
            thrust_level: sigmoid(at(2)),
            altitude_change: at(3) * 100.0,
            waypoint_skip: at(4).floor().max(0.0) as u32,
            stealth_activate: at(5) > 0.0,
        }
    }
}

/// Evaluate `network` for one state vector. With probability
/// `exploration_rate`, each raw output is perturbed by `N(0, 0.1)` noise
/// before being mapped to the action schema.
pub fn evaluate(
    network: &PolicyNetwork,
    state_vector: &[f64],
    exploration_rate: f64,
    rng: &mut dyn RngCore,
) -> ActionVector {
    let mut raw = network.forward(state_vector);
    if rng.gen::<f64>() < exploration_rate {
        for value in raw.iter_mut() {
            *value += sample_gaussian(rng, 0.0, wayfarer_core::constants::EXPLORATION_NOISE_STD);
        }
    }
    ActionVector::from_raw(&raw)
}

/// Box-Muller sample from `N(mean, std)`.
fn sample_gaussian(rng: &mut dyn RngCore, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    let z0 = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std * z0
}

/// Features feeding `encode_state`. Scalars are appended after the
/// normalized position/velocity components; terrain/weather/payload
/// feature slots are left as caller-supplied padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateFeatures {
    pub position: wayfarer_core::types::Vector3,
    pub velocity: wayfarer_core::types::Vector3,
    pub target_distance: f64,
    pub threat_proximity: f64,
    pub fuel_remaining: f64,
    pub time_remaining: f64,
    pub stealth_score: f64,
}

/// Normalize position/velocity by domain-typical scales, append scalar
/// features, zero-pad to `input_size`.
pub fn encode_state(features: &StateFeatures, input_size: usize) -> Vec<f64> {
    let pos_scale = wayfarer_core::constants::STATE_POSITION_SCALE;
    let vel_scale = wayfarer_core::constants::STATE_VELOCITY_SCALE;
    let mut v = vec![
        features.position.x / pos_scale,
        features.position.y / pos_scale,
        features.position.z / pos_scale,
        features.velocity.x / vel_scale,
        features.velocity.y / vel_scale,
        features.velocity.z / vel_scale,
        features.target_distance / pos_scale,
        features.threat_proximity,
        features.fuel_remaining,
        features.time_remaining,
        features.stealth_score,
    ];
    v.resize(input_size, 0.0);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn linear_identity_network(size: usize) -> PolicyNetwork {
        let weights: Vec<Vec<f64>> = (0..size)
            .map(|i| {
                let mut row = vec![0.0; size];
                row[i] = 1.0;
                row
            })
            .collect();
        let layer = Layer {
            weights,
            biases: vec![0.0; size],
        };
        PolicyNetwork::new(size, vec![layer]).unwrap()
    }

    #[test]
    fn construction_rejects_dimension_mismatch() {
        let layer = Layer {
            weights: vec![vec![1.0, 2.0]],
            biases: vec![0.0],
        };
        let result = PolicyNetwork::new(3, vec![layer]);
        assert!(matches!(result, Err(PolicyError::DimensionMismatch { .. })));
    }

    #[test]
    fn construction_rejects_empty_network() {
        assert!(matches!(
            PolicyNetwork::new(3, vec![]),
            Err(PolicyError::Empty)
        ));
    }

    #[test]
    fn evaluate_without_exploration_is_deterministic() {
        let network = linear_identity_network(6);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let state = vec![0.5, -0.2, 0.1, 0.0, -0.9, 0.3];
        let action = evaluate(&network, &state, 0.0, &mut rng);
        assert!(action.delta_heading.abs() <= std::f64::consts::FRAC_PI_4 + 1e-9);
        assert!(action.thrust_level > 0.0 && action.thrust_level < 1.0);
    }

    #[test]
    fn action_schema_clips_delta_heading() {
        let raw = vec![10.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let action = ActionVector::from_raw(&raw);
        assert!((action.delta_heading - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn encode_state_zero_pads_to_input_size() {
        let features = StateFeatures {
            position: wayfarer_core::types::Vector3::ZERO,
            velocity: wayfarer_core::types::Vector3::ZERO,
            target_distance: 0.0,
            threat_proximity: 0.0,
            fuel_remaining: 1.0,
            time_remaining: 1.0,
            stealth_score: 0.0,
        };
        let vector = encode_state(&features, 32);
        assert_eq!(vector.len(), 32);
    }
}
