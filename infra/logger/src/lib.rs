//! # Logger
//!
//! Installs the global `tracing` subscriber for settle applications: a compact
//! console layer on stderr, an optional non-blocking rolling file (plain or JSON), and an
//! env filter that `RUST_LOG` can override.
//!
//! The logging options are themselves a settings model ([`LoggerConfig::model`]),
//! so they can be loaded from the same input files as everything else and are
//! validated before any subscriber is touched.
//!
//! ## Example
//!
//! ```rust
//! # use settle_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use settle_kernel::{Catalog, Input, Kinds, Model, OptionDef, Settings, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_NAME: &str = "settle";
const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";
const MODEL_NAME: &str = "Logger";

const MESSAGES: &[(&str, &str)] = &[
    ("Logger.name_present", "Logger name cannot be empty"),
    ("Logger.level_known", "level must be one of off, error, warn, info, debug, trace"),
    ("Logger.rotation_known", "rotation must be one of minutely, hourly, daily, never"),
    ("Logger.max_files_positive", "max_files must be greater than zero"),
    ("Logger.sink_present", "No logging layers enabled. Enable console or file output."),
];

/// Resolved logging options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub name: String,
    pub console: bool,
    pub path: Option<PathBuf>,
    pub level: LevelFilter,
    pub rotation: Rotation,
    pub max_files: usize,
    pub json: bool,
    pub env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

impl LoggerConfig {
    /// The settings model describing the logging options.
    ///
    /// Every option has a default, so an empty input yields [`LoggerConfig::default`].
    /// The external key `filter` is exposed as `env_filter`.
    ///
    /// # Errors
    /// Only if the declarations themselves are inconsistent.
    pub fn model() -> Result<Model, LoggerError> {
        let catalog = MESSAGES.iter().fold(Catalog::new(), |c, (k, v)| c.with(*k, *v));
        let mut model = Model::new(MODEL_NAME).with_catalog(Arc::new(catalog));

        model
            .option(OptionDef::new("name").coerce(Kinds::STRING).with_default(DEFAULT_NAME))?
            .option(OptionDef::new("console").coerce(Kinds::BOOL).with_default(true))?
            .option(OptionDef::new("path").coerce(Kinds::STRING | Kinds::NULL).optional())?
            .option(OptionDef::new("level").coerce(Kinds::STRING).with_default("info"))?
            .option(OptionDef::new("rotation").coerce(Kinds::STRING).with_default("daily"))?
            .option(OptionDef::new("max_files").coerce(Kinds::INTEGER).with_default(DEFAULT_MAX_FILES))?
            .option(OptionDef::new("json").coerce(Kinds::BOOL).with_default(false))?
            .option(
                OptionDef::new("filter")
                    .rename("env_filter")
                    .coerce(Kinds::STRING | Kinds::NULL)
                    .optional(),
            )?
            .validate(|s, errors| {
                if s.get_as::<String>("name")?.trim().is_empty() {
                    errors.add("name_present");
                }
                if s.get_as::<String>("level")?.parse::<LevelFilter>().is_err() {
                    errors.add("level_known");
                }
                if parse_rotation(&s.get_as::<String>("rotation")?).is_none() {
                    errors.add("rotation_known");
                }
                if s.get_as::<i64>("max_files")? <= 0 {
                    errors.add("max_files_positive");
                }
                if !s.get_as::<bool>("console")? && s.option("path").is_none_or(Value::is_null) {
                    errors.add("sink_present");
                }
                Ok(())
            });

        Ok(model)
    }

    /// Builds the logging options from raw input (e.g. the `[logging]` table of a file).
    ///
    /// # Errors
    /// Returns [`LoggerError::Settings`] when the input does not satisfy [`LoggerConfig::model`].
    pub fn from_input(input: impl Into<Input>) -> Result<Self, LoggerError> {
        let settings = Self::model()?.build(input).context("Invalid logging settings")?;
        Self::try_from(&settings)
    }
}

impl TryFrom<&Settings> for LoggerConfig {
    type Error = LoggerError;

    fn try_from(s: &Settings) -> Result<Self, Self::Error> {
        let level = s.get_as::<String>("level")?;
        let rotation = s.get_as::<String>("rotation")?;

        Ok(Self {
            name: s.get_as("name")?,
            console: s.get_as("console")?,
            path: s.get_as::<Option<String>>("path")?.map(PathBuf::from),
            level: level.parse().map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid level '{level}': {e}").into(),
                context: None,
            })?,
            rotation: parse_rotation(&rotation).ok_or_else(|| LoggerError::InvalidConfiguration {
                message: format!("Invalid rotation '{rotation}'").into(),
                context: None,
            })?,
            max_files: s.get_as("max_files")?,
            json: s.get_as("json")?,
            env_filter: s.get_as("env_filter")?,
        })
    }
}

fn parse_rotation(raw: &str) -> Option<Rotation> {
    match raw.to_ascii_lowercase().as_str() {
        "minutely" => Some(Rotation::MINUTELY),
        "hourly" => Some(Rotation::HOURLY),
        "daily" => Some(Rotation::DAILY),
        "never" => Some(Rotation::NEVER),
        _ => None,
    }
}

/// A builder for configuring and initializing the global tracing subscriber.
#[derive(Debug, Default)]
pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl From<LoggerConfig> for LoggerBuilder {
    fn from(config: LoggerConfig) -> Self {
        Self { config }
    }
}

impl LoggerBuilder {
    /// Sets the name of the logger, also the prefix of rolling log files.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit env filter (e.g., `settle_kernel=debug`).
    ///
    /// Invalid filters will cause [`LoggerBuilder::init`] to return an error.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Directory for rolling log files.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Writes the file layer as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Consumes the builder and initializes the global tracing subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. It owns the [`WorkerGuard`] of the file writer and must
    /// be kept alive so buffered lines are flushed.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber has already been set.
    /// Returns [`LoggerError::InvalidConfiguration`] for invalid builder settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let config = self.config;
        validate_config(&config)?;

        let env_filter = build_env_filter(&config)?;
        let mut layers = Vec::new();

        if config.console {
            layers.push(layer().compact().with_writer(std::io::stderr).with_ansi(true).boxed());
        }

        let guard = if let Some(path) = &config.path {
            fs::create_dir_all(path).map_err(|e| LoggerError::Internal {
                message: e.to_string().into(),
                context: Some(format!("Failed to create path: {}", path.display()).into()),
            })?;

            let appender = RollingFileAppender::builder()
                .rotation(config.rotation.clone())
                .filename_prefix(&config.name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(config.max_files)
                .build(path)?;

            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file_layer = layer().with_writer(writer).with_ansi(false);

            layers.push(if config.json { file_layer.json().boxed() } else { file_layer.boxed() });
            Some(guard)
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging layers enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;
        tracing::debug!(name = %config.name, level = %config.level, "logger initialized");

        Ok(Logger { guard })
    }
}

/// A handle to the initialized logging system.
///
/// Drop it only when the application is shutting down.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a builder preloaded with [`LoggerConfig::default`].
    ///
    /// ```rust
    /// use settle_logger::{LevelFilter, Logger};
    ///
    /// let builder = Logger::builder().name("my-app").level(LevelFilter::DEBUG);
    /// assert_eq!(builder.config().name, "my-app");
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn validate_config(config: &LoggerConfig) -> Result<(), LoggerError> {
    if config.name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Logger name cannot be empty".into(),
            context: None,
        });
    }

    if config.max_files == 0 {
        return Err(LoggerError::InvalidConfiguration {
            message: "max_files must be greater than zero".into(),
            context: None,
        });
    }

    Ok(())
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
