//! # mnemo-core
//!
//! Core types and primitives for the Mnemo memory router.
//! This crate defines the shared vocabulary used by every other crate in the workspace:
//! memory units, their closed classification enums, policy decisions and the error type.

pub mod decision;
pub mod error;
pub mod types;
pub mod unit;

pub use decision::PolicyDecision;
pub use error::{MnemoError, Result};
pub use types::*;
pub use unit::{DEFAULT_CONFIDENCE, MemoryUnit};
