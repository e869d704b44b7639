//! Workspace configuration and logging setup for chainfill hosts.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once, OnceLock};

use chainfill_format::FormatConfig;
use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Top-level `chainfill.toml`.
///
/// ```toml
/// [format]
/// indent_width = 4
/// indent_style = "spaces"
/// max_line_length = 100
/// continuation_indent = 8
/// chain_wrap = "if_long"
///
/// [logging]
/// level = "debug"
/// json = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainfillConfig {
    #[serde(default)]
    pub format: FormatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Append logs to this file instead of writing them to stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Level applied to every target not named by a directive.
const BASE_DIRECTIVE: &str = "warn";

impl LoggingConfig {
    fn default_level() -> String {
        BASE_DIRECTIVE.to_owned()
    }

    /// Filter directives for `level`.
    ///
    /// A bare level (`debug`, `TRACE`, `off`, ...) only applies to the
    /// `chainfill.*` targets; dependencies stay at `warn`. Anything else is
    /// taken as an `EnvFilter` directive string.
    pub(crate) fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            return BASE_DIRECTIVE.to_owned();
        }
        match level.parse::<LevelFilter>() {
            Ok(level) => format!("{BASE_DIRECTIVE},chainfill={level}"),
            Err(_) => level.to_owned(),
        }
    }

    /// The effective filter: [`directives`](Self::directives), followed by the
    /// `RUST_LOG` directives when set. Invalid directives fall back to `warn`.
    pub fn env_filter(&self) -> EnvFilter {
        let mut directives = self.directives();
        if let Some(env) = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            directives.push(',');
            directives.push_str(env.trim());
        }
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(BASE_DIRECTIVE))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // `Display` includes a source snippet; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl ChainfillConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

pub const CHAINFILL_CONFIG_ENV_VAR: &str = "CHAINFILL_CONFIG_PATH";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Tests that temporarily set [`CHAINFILL_CONFIG_ENV_VAR`] wrap the mutation
/// and the discovery call in this so concurrent discovery never observes the
/// override.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Discover the configuration file for a workspace root.
///
/// Search order:
/// 1) `CHAINFILL_CONFIG_PATH` (absolute or relative to `workspace_root`)
/// 2) `chainfill.toml` in `workspace_root`
/// 3) `.chainfill.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(CHAINFILL_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["chainfill.toml", ".chainfill.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a workspace root.
///
/// If no config is present, returns [`ChainfillConfig::default`] and `None`.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(ChainfillConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((ChainfillConfig::default(), None));
    };

    let config = ChainfillConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}

static TRACING_INIT: Once = Once::new();

/// Install the global `tracing` subscriber.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let file = config.file.as_ref().and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        let file_failed = config.file.is_some() && file.is_none();

        let layer: Box<dyn Layer<_> + Send + Sync> = match (config.json, file) {
            (true, Some(file)) => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .boxed(),
            (true, None) => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed(),
            (false, Some(file)) => tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .boxed(),
            (false, None) => tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed(),
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() && file_failed {
            if let Some(path) = config.file.as_ref() {
                tracing::warn!(
                    target: "chainfill.config",
                    path = %path.display(),
                    "failed to open log file; logging to stderr"
                );
            }
        }
    });
}
