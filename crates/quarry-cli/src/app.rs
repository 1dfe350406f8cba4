//! QuarryCli application.
//!
//! Owns the loaded configuration and dispatches parsed commands to the
//! store and config handlers.

use crate::cli::{CliArgs, Command};
use crate::config::QuarryConfig;
use crate::config_handlers;
use crate::store_handlers::{self, IndexOptions, SearchOptions};
use quarry_core::Result;
use tracing_subscriber::EnvFilter;

// ============================================================================
// QuarryCli
// ============================================================================

/// The `quarry` command-line application.
pub struct QuarryCli {
    config: QuarryConfig,
    version: String,
}

impl QuarryCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let config = QuarryConfig::load(args.config.as_deref())?;
        Ok(Self::new(config))
    }

    /// Create an application around an already-loaded configuration.
    pub fn new(config: QuarryConfig) -> Self {
        Self {
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &QuarryConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    /// Library crates log through `log`; the subscriber picks those records up.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);
        tracing::debug!(version = %self.version, "quarry starting");

        match args.command {
            Some(Command::Index {
                paths,
                no_split,
                batch_size,
                extensions,
            }) => {
                let options = IndexOptions {
                    paths,
                    no_split,
                    batch_size,
                    extensions,
                };
                store_handlers::handle_index(&self.config, options).await?;
                Ok(())
            }
            Some(Command::Query {
                text,
                limit,
                ratio,
                text_only,
                conditions,
                json,
            }) => {
                let options = SearchOptions {
                    text,
                    limit,
                    ratio,
                    text_only,
                    conditions,
                    json,
                };
                store_handlers::handle_query(&self.config, options).await?;
                Ok(())
            }
            Some(Command::Remove { ids }) => store_handlers::handle_remove(&self.config, &ids),
            Some(Command::Drop) => store_handlers::handle_drop(&self.config),
            Some(Command::Stats) => store_handlers::handle_stats(&self.config),
            Some(Command::Config(config_cmd)) => {
                config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
            }
            None => {
                println!("quarry {}; use --help for usage", self.version);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
