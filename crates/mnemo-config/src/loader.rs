use std::path::{Path, PathBuf};
use tracing::{info, warn};

use mnemo_core::MnemoError;

use crate::schema::MnemoConfig;

/// Loads the Mnemo configuration once per process.
pub struct ConfigLoader {
    config: MnemoConfig,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > MNEMO_CONFIG env > ~/.mnemo/mnemo.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("MNEMO_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mnemo")
            .join("mnemo.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> mnemo_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            MnemoConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        // Validate config: log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(MnemoError::Config(e));
            }
        }

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn get(&self) -> &MnemoConfig {
        &self.config
    }

    /// The resolved config path. The file may not exist if defaults were used.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn read(path: &Path) -> mnemo_core::Result<MnemoConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<MnemoConfig>(&raw).map_err(|e| {
            MnemoError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply env var overrides (MNEMO_DB_PATH, MNEMO_LOG_LEVEL, ...).
    fn apply_env_overrides(mut config: MnemoConfig) -> MnemoConfig {
        if let Ok(v) = std::env::var("MNEMO_DB_PATH") {
            config.memory.db_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("MNEMO_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("MNEMO_EMBEDDING_MODEL") {
            config.embedding.model = v;
        }
        // Config file takes priority, env is the fallback.
        if config.embedding.api_key.is_none() {
            if let Ok(v) = std::env::var("OPENAI_API_KEY") {
                config.embedding.api_key = Some(v);
            }
        }
        config
    }
}
