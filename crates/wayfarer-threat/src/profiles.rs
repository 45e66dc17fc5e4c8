//! Alert-level state machine: a pure function of the currently-registered
//! threat set's maximum confidence.
//!
//! A single escalation ladder rather than a per-entity phase machine —
//! no hidden state, no transition table, just a fold over the current
//! threat set.

use wayfarer_core::enums::AlertLevel;
use wayfarer_core::threat::ThreatLocation;

/// Derive the alert level from the threat set's maximum confidence.
/// Empty threats always yield `Normal`.
pub fn evaluate_alert_level(threats: &[ThreatLocation]) -> AlertLevel {
    let max_confidence = threats
        .iter()
        .map(|t| t.confidence)
        .fold(0.0_f64, f64::max);

    if max_confidence > 0.9 {
        AlertLevel::Combat
    } else if max_confidence > 0.7 {
        AlertLevel::Critical
    } else if max_confidence > 0.5 {
        AlertLevel::High
    } else if max_confidence > 0.3 {
        AlertLevel::Elevated
    } else {
        AlertLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::enums::ThreatType;
    use wayfarer_core::types::Vector3;

    fn threat(confidence: f64) -> ThreatLocation {
        ThreatLocation {
            position: Vector3::ZERO,
            effect_radius: 500.0,
            confidence,
            threat_type: ThreatType::Sam,
        }
    }

    #[test]
    fn empty_threat_set_is_normal() {
        assert_eq!(evaluate_alert_level(&[]), AlertLevel::Normal);
    }

    #[test]
    fn escalation_ladder_matches_thresholds() {
        assert_eq!(evaluate_alert_level(&[threat(0.95)]), AlertLevel::Combat);
        assert_eq!(evaluate_alert_level(&[threat(0.75)]), AlertLevel::Critical);
        assert_eq!(evaluate_alert_level(&[threat(0.55)]), AlertLevel::High);
        assert_eq!(evaluate_alert_level(&[threat(0.35)]), AlertLevel::Elevated);
        assert_eq!(evaluate_alert_level(&[threat(0.1)]), AlertLevel::Normal);
    }

    #[test]
    fn level_is_driven_by_the_maximum_confidence_threat() {
        let threats = vec![threat(0.2), threat(0.92), threat(0.4)];
        assert_eq!(evaluate_alert_level(&threats), AlertLevel::Combat);
    }
}
