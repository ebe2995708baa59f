use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use console::style;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use mnemo_config::{ConfigLoader, MnemoConfig, WarningSeverity};
use mnemo_core::{MnemoError, Result};
use mnemo_policy::PolicyEngine;

mod memory;

/// Mnemo: policy-driven multi-tier memory for conversational agents
#[derive(Parser)]
#[command(name = "mnemo", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to mnemo.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route extracted memory units (a JSON array) into the memory tiers
    Ingest {
        /// Session the units were extracted from
        #[arg(short, long)]
        session: String,
        /// File holding the extraction output ("-" or omitted reads stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Current user message; when set, the composed context is printed too
        #[arg(short, long)]
        message: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show memory counts for a session
    Stats {
        session: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a session's episodic timeline, oldest first
    Timeline {
        session: String,
        /// Only the last N events
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show the most recent episodic events across all sessions
    Recent {
        /// Number of events to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Search semantic memory by similarity to a query
    Search {
        query: String,
        /// Maximum number of hits
        #[arg(short = 'k', long, default_value = "10")]
        top_k: usize,
        /// Ignore units below this confidence (defaults to retrieval.min_confidence)
        #[arg(long)]
        min_confidence: Option<f64>,
    },
    /// Deprecate a semantic memory unit
    Deprecate { id: Uuid },
    /// Raise the confidence of a semantic memory unit
    Reinforce {
        id: Uuid,
        /// Confidence added (result is capped at 1.0)
        #[arg(short, long, default_value = "0.1")]
        boost: f64,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the routing rules in evaluation order
    Rules,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level
                .as_deref()
                .unwrap_or(config.logging.level.as_str())
        };

        if config.logging.format == "json" {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
                )
                .json()
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
                )
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }

        match self.command {
            Commands::Ingest {
                session,
                file,
                message,
                json,
            } => memory::cmd_ingest(config, &session, file, message, json).await,
            Commands::Stats { session, json } => memory::cmd_stats(config, &session, json).await,
            Commands::Timeline { session, limit } => {
                memory::cmd_timeline(config, &session, limit).await
            }
            Commands::Recent { limit } => memory::cmd_recent(config, limit).await,
            Commands::Search {
                query,
                top_k,
                min_confidence,
            } => memory::cmd_search(config, &query, top_k, min_confidence).await,
            Commands::Deprecate { id } => memory::cmd_deprecate(config, id).await,
            Commands::Reinforce { id, boost } => memory::cmd_reinforce(config, id, boost).await,
            Commands::Config { json } => Self::cmd_config(config, config_loader.path(), json),
            Commands::Rules => Self::cmd_rules(config),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: &MnemoConfig, path: &Path, json: bool) -> Result<()> {
        if path.exists() {
            eprintln!("{} {}", style("config:").dim(), path.display());
        } else {
            eprintln!(
                "{} {} not found, showing defaults",
                style("config:").dim(),
                path.display()
            );
        }
        let mut shown = config.clone();
        if shown.embedding.api_key.is_some() {
            shown.embedding.api_key = Some("********".into());
        }
        if json {
            println!("{}", serde_json::to_string_pretty(&shown)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&shown).map_err(|e| MnemoError::Config(e.to_string()))?
            );
        }

        // Only warnings can remain here; errors fail the load.
        if let Ok(warnings) = config.validate() {
            for w in warnings.iter().filter(|w| w.severity == WarningSeverity::Warning) {
                eprintln!("{} {w}", style("!").yellow());
            }
        }
        Ok(())
    }

    fn cmd_rules(config: &MnemoConfig) -> Result<()> {
        let engine = PolicyEngine::from_config(&config.policy);
        for (i, rule) in engine.rules().iter().enumerate() {
            println!(
                "{:>2}. {:<26} {}",
                i + 1,
                style(rule.name).bold(),
                serde_json::to_string(&rule.action)?
            );
            println!("    {}", style(rule.reason).dim());
        }
        println!();
        println!(
            "supersession: same kind and scope, word overlap > {}, strictly higher confidence",
            engine.overlap_threshold()
        );
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "mnemo", &mut std::io::stdout());
        Ok(())
    }
}
