//! # mnemo-cli
//!
//! Command-line interface for the Mnemo memory router.
//!
//! ## Commands
//!
//! - `mnemo ingest`: Route extracted memory units into the tiers
//! - `mnemo stats`: Per-session memory counts
//! - `mnemo timeline` / `mnemo recent`: Read the episodic log
//! - `mnemo search`: Similarity search over the semantic tier
//! - `mnemo deprecate` / `mnemo reinforce`: Adjust semantic memory
//! - `mnemo config` / `mnemo rules`: Inspect configuration and routing rules

pub mod commands;

pub use commands::Cli;
