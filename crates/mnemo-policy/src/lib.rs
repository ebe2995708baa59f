//! # mnemo-policy
//!
//! Decides where each candidate memory unit goes. Rules form an ordered table
//! evaluated top-down; the first match wins. Decisions are plain values, the
//! router applies them.

pub mod engine;
pub mod overlap;
pub mod rules;

pub use engine::{PolicyEngine, RetentionTable};
pub use overlap::lexical_overlap;
pub use rules::{PolicyRule, RuleAction, default_rules};
