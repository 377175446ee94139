//! Project configuration (neoak.toml)
//!
//! Every key is optional; a project without a `neoak.toml` runs with the
//! defaults below.
//!
//! ```toml
//! [project]
//! entry = ["Main.nk", "Main.nk.java", "Main.java"]
//! extensions = [".nk", ".nk.java", ".java"]
//! exclude = ["build/**", "target/**"]
//!
//! [run]
//! max_call_depth = 2048
//! stack_size_mb = 256
//! ```

use neoak_engine::vm::DEFAULT_MAX_CALL_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "neoak.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the file
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },

    /// An exclude glob that does not compile
    #[error("invalid exclude pattern '{pattern}': {source}")]
    Pattern {
        /// The pattern text
        pattern: String,
        /// Underlying error
        #[source]
        source: glob::PatternError,
    },

    /// Validation error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Contents of `neoak.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Source discovery settings
    pub project: ProjectConfig,

    /// Execution settings
    pub run: RunConfig,
}

/// `[project]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Entry file names, in precedence order
    pub entry: Vec<String>,

    /// Accepted source file suffixes
    pub extensions: Vec<String>,

    /// Glob patterns, relative to the project root, that are never loaded
    pub exclude: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            entry: strings(&["Main.nk", "Main.nk.java", "Main.java"]),
            extensions: strings(&[".nk", ".nk.java", ".java"]),
            exclude: strings(&["build/**", "target/**"]),
        }
    }
}

/// `[run]` table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Nested call bound before `StackOverflowError`
    pub max_call_depth: usize,

    /// Stack size of the executor thread, in MiB
    pub stack_size_mb: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            stack_size_mb: 256,
        }
    }
}

impl RunConfig {
    /// Stack size in bytes.
    pub fn stack_size(&self) -> usize {
        self.stack_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Config {
    /// Load `neoak.toml` from a project root, or the defaults if absent.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            log::debug!("no {} under {}, using defaults", CONFIG_FILE, root.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate()?;
        log::debug!("loaded {}", path.display());
        Ok(config)
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no project can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.entry.is_empty() {
            return Err(ConfigError::Invalid("project.entry must name at least one file".into()));
        }
        if self.project.extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "project.extensions must list at least one suffix".into(),
            ));
        }
        if let Some(ext) = self.project.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(ConfigError::Invalid(format!(
                "extension '{}' must start with '.'",
                ext
            )));
        }
        if self.run.max_call_depth == 0 {
            return Err(ConfigError::Invalid("run.max_call_depth must be positive".into()));
        }
        if self.run.stack_size_mb == 0 {
            return Err(ConfigError::Invalid("run.stack_size_mb must be positive".into()));
        }
        self.exclude_patterns()?;
        Ok(())
    }

    /// Compiled exclude globs.
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>, ConfigError> {
        self.project
            .exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|source| ConfigError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
