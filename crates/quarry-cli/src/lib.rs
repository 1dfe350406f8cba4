//! CLI for Quarry document stores.
//!
//! Wires the `quarry` binary: argument parsing, layered configuration,
//! logging setup, and the handlers behind each subcommand.
//!
//! # Key Abstractions
//!
//! - [`QuarryCli`]: owns the loaded config and dispatches commands
//! - [`QuarryConfig`]: TOML + environment configuration via `confyg`

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod store_handlers;

pub use app::QuarryCli;
pub use cli::{CliArgs, Command, ConfigAction};
pub use config::QuarryConfig;
