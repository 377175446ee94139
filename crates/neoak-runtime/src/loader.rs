//! Source discovery.
//!
//! Walks a project tree and produces the ordered source units of one
//! compilation: the entry unit first, then every other accepted file in
//! lexicographic order of its path relative to the project root.

use crate::config::{Config, ConfigError};
use neoak_engine::SourceUnit;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while discovering sources
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The given path does not exist
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No file matched any entry name
    #[error("no entry file ({names}) found under {}", root.display())]
    NoEntry {
        /// Project root
        root: PathBuf,
        /// Entry names that were tried
        names: String,
    },

    /// A source file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The directory walk failed
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        /// Project root
        root: PathBuf,
        /// Underlying error
        #[source]
        source: walkdir::Error,
    },

    /// `neoak.toml` is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A discovered project, ready to compile.
#[derive(Debug, Clone)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,
    /// Effective configuration
    pub config: Config,
    /// Source units, entry unit first
    pub units: Vec<SourceUnit>,
}

impl Project {
    /// The entry unit.
    pub fn entry(&self) -> Option<&SourceUnit> {
        self.units.first()
    }
}

/// A candidate source file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SourceFile {
    /// `/`-separated path relative to the root; sort key and display path
    relative: String,
    path: PathBuf,
}

/// Discover the project at `path`.
///
/// A directory is the project root. A file is the entry unit, and its
/// parent directory is the project root.
pub fn discover(path: &Path) -> Result<Project, DiscoveryError> {
    if !path.exists() {
        return Err(DiscoveryError::NotFound(path.to_path_buf()));
    }
    let (root, entry_file) = if path.is_file() {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        (parent, Some(path.to_path_buf()))
    } else {
        (path.to_path_buf(), None)
    };

    let config = Config::load(&root)?;
    let mut files = collect_sources(&root, &config)?;

    let entry = match entry_file {
        Some(file) => {
            let relative = relative_path(&root, &file);
            match files.iter().position(|f| f.relative == relative) {
                Some(index) => files.remove(index),
                None => SourceFile { relative, path: file },
            }
        }
        None => {
            let index = find_entry(&files, &config.project.entry).ok_or_else(|| {
                DiscoveryError::NoEntry {
                    root: root.clone(),
                    names: config.project.entry.join(", "),
                }
            })?;
            files.remove(index)
        }
    };
    log::debug!("entry unit: {}", entry.relative);

    let mut units = Vec::with_capacity(files.len() + 1);
    for file in std::iter::once(entry).chain(files) {
        let text = std::fs::read_to_string(&file.path).map_err(|source| DiscoveryError::Read {
            path: file.path.clone(),
            source,
        })?;
        units.push(SourceUnit::preprocess(file.relative, &text));
    }
    log::debug!("discovered {} source units under {}", units.len(), root.display());

    Ok(Project { root, config, units })
}

/// Accepted, non-excluded files under `root`, sorted by relative path.
fn collect_sources(root: &Path, config: &Config) -> Result<Vec<SourceFile>, DiscoveryError> {
    let excludes = config.exclude_patterns()?;
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_string_lossy().as_ref()));

    for entry in walker {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !config.project.extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            continue;
        }
        let relative = relative_path(root, entry.path());
        if excludes.iter().any(|p| p.matches(&relative)) {
            log::trace!("excluded {}", relative);
            continue;
        }
        files.push(SourceFile {
            relative,
            path: entry.path().to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// First entry name with any match decides; among its matches the first
/// relative path wins.
fn find_entry(files: &[SourceFile], names: &[String]) -> Option<usize> {
    names.iter().find_map(|name| {
        files
            .iter()
            .position(|f| f.relative.rsplit('/').next() == Some(name.as_str()))
    })
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
