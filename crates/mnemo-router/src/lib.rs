//! # mnemo-router
//!
//! Orchestration over the three memory tiers. The router runs each candidate
//! through the policy engine, applies the resulting decision to storage,
//! retrieves cross-tier context and composes it into one view.

pub mod context;
pub mod pipeline;
pub mod router;

pub use context::{ContextSummary, ContextView, MemoryStats, RetrievedContext, TierBreakdown, compose};
pub use pipeline::{ProcessOptions, ProcessOutcome};
pub use router::{MemoryRouter, Rejection, RouteOutcome};
