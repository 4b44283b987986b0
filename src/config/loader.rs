//! Configuration loading and discovery for `raven.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::RavenConfig;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery
pub const CONFIG_FILE_NAME: &str = "raven.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse raven.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    /// Override answer options per puzzle
    pub option_count: Option<usize>,
    /// Override highest session level
    pub max_levels: Option<u32>,
    pub questions_per_level: Option<usize>,
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given with `--config`
    Explicit(PathBuf),
    /// raven.toml in the working directory or one of its ancestors
    Project(PathBuf),
    /// The per-user file under the XDG config directory
    User(PathBuf),
    /// No file found; built-in defaults
    Defaults,
}

impl ConfigSource {
    /// File backing this source, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Project(p) | ConfigSource::User(p) => {
                Some(p)
            }
            ConfigSource::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Explicit(p) => write!(f, "{} (--config)", p.display()),
            ConfigSource::Project(p) => write!(f, "{} (project)", p.display()),
            ConfigSource::User(p) => write!(f, "{} (user)", p.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Locate the configuration to use when no path is given.
///
/// The nearest raven.toml from the working directory upward wins over the
/// per-user file; with neither present the defaults apply.
pub fn find_config() -> ConfigSource {
    env::current_dir()
        .ok()
        .and_then(|cwd| find_config_from(&cwd))
        .or_else(|| user_config_dir().and_then(|dir| find_user_config(&dir)))
        .unwrap_or(ConfigSource::Defaults)
}

/// Nearest raven.toml in `start` or any ancestor.
pub fn find_config_from(start: &Path) -> Option<ConfigSource> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .map(ConfigSource::Project)
}

/// `ravenmatrix/raven.toml` under a user config directory.
pub fn find_user_config(config_home: &Path) -> Option<ConfigSource> {
    let candidate = config_home.join("ravenmatrix").join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(ConfigSource::User(candidate))
}

/// `$XDG_CONFIG_HOME`, falling back to `~/.config`
fn user_config_dir() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Load configuration from a raven.toml file.
///
/// Shorthand for [`load_config_with_source`] when the origin does not matter.
///
/// # Example
/// ```no_run
/// use ravenmatrix::config::load_config;
/// use std::path::Path;
///
/// let discovered = load_config(None)?;
/// let explicit = load_config(Some(Path::new("puzzles/raven.toml")))?;
/// # Ok::<(), ravenmatrix::config::ConfigError>(())
/// ```
pub fn load_config(path: Option<&Path>) -> Result<RavenConfig, ConfigError> {
    load_config_with_source(path).map(|(config, _)| config)
}

/// Load and validate the configuration, reporting where it came from.
///
/// An explicit `path` must exist; otherwise discovery runs and falls back
/// to [`default_config`].
pub fn load_config_with_source(
    path: Option<&Path>,
) -> Result<(RavenConfig, ConfigSource), ConfigError> {
    let source = match path {
        Some(p) => ConfigSource::Explicit(p.to_path_buf()),
        None => find_config(),
    };

    let config = match source.path() {
        Some(p) => load_config_file(p)?,
        None => default_config(),
    };
    tracing::debug!(source = %source, "configuration loaded");
    Ok((config, source))
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<RavenConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: RavenConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Configuration used when no raven.toml is found.
pub fn default_config() -> RavenConfig {
    RavenConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. The merged result
/// is validated again, since an override can break a rule the file satisfied.
pub fn merge_cli_overrides(
    config: &mut RavenConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    if let Some(option_count) = overrides.option_count {
        config.generator.option_count = option_count;
    }
    if let Some(max_levels) = overrides.max_levels {
        config.session.max_levels = max_levels;
    }
    if let Some(questions_per_level) = overrides.questions_per_level {
        config.session.questions_per_level = questions_per_level;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(())
}
