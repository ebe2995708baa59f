//! # mnemo-config
//!
//! Configuration system for Mnemo. Reads from `mnemo.toml` and environment
//! variables, in that precedence order.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::MnemoConfig;
pub use schema::{
    ConfigWarning, EmbeddingConfig, LoggingConfig, MemoryConfig, PolicyConfig, RetrievalConfig,
    WarningSeverity,
};
