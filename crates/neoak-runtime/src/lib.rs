//! NeOak Runtime
//!
//! Binds the NeOak engine to projects on disk:
//! - [`config`]: `neoak.toml` loading and defaults
//! - [`loader`]: source discovery and preprocessing into source units
//! - [`compile`]: parse → check → lower
//! - [`executor`]: running programs on a dedicated thread, and the
//!   `run` / `check` / `emit` / `exec` commands

pub mod compile;
pub mod config;
pub mod error;
pub mod executor;
pub mod loader;

pub use compile::{check_units, compile_source, compile_units, parse_units};
pub use config::{Config, ConfigError, ProjectConfig, RunConfig, CONFIG_FILE};
pub use error::{RuntimeError, EXIT_COMPILE, EXIT_DISCOVERY};
pub use executor::{check_path, emit_path, exec_artifact, run_path, CheckReport, RunOptions, Runtime};
pub use loader::{discover, DiscoveryError, Project};
pub use neoak_engine::RunOutcome;
