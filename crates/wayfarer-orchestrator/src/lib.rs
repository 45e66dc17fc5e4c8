//! The planner orchestrator (component C7): the top-level facade that
//! drives the four-stage pipeline over `wayfarer-agents`,
//! `wayfarer-physics`, `wayfarer-scoring`, and `wayfarer-threat`.

pub mod cancellation;
pub mod capability;
mod metrics;
mod orchestrator;
mod rule_based;

#[cfg(test)]
mod test_support;

pub use cancellation::CancellationToken;
pub use capability::{NoopStealth, StealthCapability};
pub use orchestrator::PlannerOrchestrator;
