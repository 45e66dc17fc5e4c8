//! Experience buffer row shape, fed by the orchestrator after each plan is
//! scored and consumed by the agent pool's `train_from_experience`.

use serde::{Deserialize, Serialize};

use crate::enums::PayloadClass;
use crate::types::{Instant, TrajectoryId};

/// One outcome record: which trajectory, for which payload, how it scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub trajectory_id: TrajectoryId,
    pub payload_class: PayloadClass,
    pub reward: f64,
    pub recorded_at: Instant,
}

impl ExperienceEntry {
    pub fn new(
        trajectory_id: TrajectoryId,
        payload_class: PayloadClass,
        reward: f64,
        recorded_at: Instant,
    ) -> Self {
        Self {
            trajectory_id,
            payload_class,
            reward,
            recorded_at,
        }
    }
}

/// Fixed-capacity, oldest-first-eviction ring of recent experience entries.
#[derive(Debug, Clone)]
pub struct ExperienceBuffer {
    entries: std::collections::VecDeque<ExperienceEntry>,
    capacity: usize,
}

impl ExperienceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: std::collections::VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Push a new entry, evicting the oldest if at capacity.
    pub fn push(&mut self, entry: ExperienceEntry) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExperienceEntry> {
        self.entries.iter()
    }

    pub fn for_payload(&self, class: PayloadClass) -> impl Iterator<Item = &ExperienceEntry> {
        self.entries.iter().filter(move |e| e.payload_class == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_evicts_oldest_when_full() {
        let mut buffer = ExperienceBuffer::new(2);
        let t0 = Instant::from_secs_f64(0.0);
        buffer.push(ExperienceEntry::new(TrajectoryId(1), PayloadClass::Uav, 1.0, t0));
        buffer.push(ExperienceEntry::new(TrajectoryId(2), PayloadClass::Uav, 2.0, t0));
        buffer.push(ExperienceEntry::new(TrajectoryId(3), PayloadClass::Uav, 3.0, t0));
        assert_eq!(buffer.len(), 2);
        let ids: Vec<u64> = buffer.iter().map(|e| e.trajectory_id.0).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn for_payload_filters_by_class() {
        let mut buffer = ExperienceBuffer::new(10);
        let t0 = Instant::from_secs_f64(0.0);
        buffer.push(ExperienceEntry::new(TrajectoryId(1), PayloadClass::Uav, 1.0, t0));
        buffer.push(ExperienceEntry::new(TrajectoryId(2), PayloadClass::Submarine, 1.0, t0));
        assert_eq!(buffer.for_payload(PayloadClass::Uav).count(), 1);
    }
}
