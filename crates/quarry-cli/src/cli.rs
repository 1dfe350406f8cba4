//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Index and query Quarry document stores.
#[derive(Parser, Debug)]
#[command(name = "quarry", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "QUARRY_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load text files, vectorize them and add them to the cache store.
    Index {
        /// Files or directories to index.
        #[arg(required = true)]
        paths: Vec<String>,

        /// Store each file as a single document instead of splitting it.
        #[arg(long)]
        no_split: bool,

        /// Documents per vectorize-and-store batch (overrides config).
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// File extensions accepted when walking directories.
        #[arg(short, long, value_delimiter = ',', default_value = "txt,md")]
        extensions: Vec<String>,
    },

    /// Retrieve documents relevant to a text query.
    Query {
        /// Query text.
        text: String,

        /// Maximum number of results (overrides config).
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Weight of the vector score in hybrid queries, 0.0 to 1.0.
        #[arg(short, long)]
        ratio: Option<f32>,

        /// Keyword matching only; skip vectorizing the query.
        #[arg(long)]
        text_only: bool,

        /// Only return documents whose metadata has `key=value` (repeatable).
        #[arg(short = 'w', long = "where", value_name = "KEY=VALUE")]
        conditions: Vec<String>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove documents by id.
    Remove {
        /// Ids of the documents to remove.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete every document and the cache file.
    Drop,

    /// Show store statistics.
    Stats,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Get a configuration value by dotted key (e.g. `store.distance`).
    Get {
        /// Dotted key path.
        key: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
