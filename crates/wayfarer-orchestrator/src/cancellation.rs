//! Re-exported from `wayfarer-core` so the same token can be threaded
//! through both the orchestrator's pipeline stage boundaries and the
//! agent rollouts `wayfarer-agents` runs underneath it.

pub use wayfarer_core::cancellation::CancellationToken;
