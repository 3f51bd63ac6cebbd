use config::{Config, Environment, File};
use settle_domain::{Input, Value};
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Default environment prefix for overrides (`SETTLE__TOKEN=...`).
pub const DEFAULT_ENV_PREFIX: &str = "SETTLE";

#[settle_derive::settle_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Config shape error{}: {message}", format_context(.context))]
    Shape { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Loads settings input from a file layered with environment overrides.
///
/// 1. **Base File**: the file at `path`; its format follows the extension
///    (`.toml`, `.json`, `.yaml`, ...). The file is required.
/// 2. **Environment Overrides**: variables prefixed with `prefix` (defaults to
///    [`DEFAULT_ENV_PREFIX`]) and `__`, e.g. `SETTLE__TOKEN` maps to `token`.
///
/// The result is ready to be handed to [`Model::build`](crate::Model::build).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or malformed, and
/// [`ConfigError::Shape`] if the merged document is not a table.
///
/// # Example
/// ```rust,no_run
/// use settle_kernel::config::load_input;
///
/// let input = load_input("settings/github.toml", None).unwrap_or_default();
/// ```
pub fn load_input(path: impl AsRef<Path>, prefix: Option<&str>) -> Result<Input, ConfigError> {
    let prefix = prefix.unwrap_or(DEFAULT_ENV_PREFIX);
    load(path.as_ref(), environment(prefix))
}

fn environment(prefix: &str) -> Environment {
    Environment::with_prefix(prefix).separator("__").convert_case(config::Case::Snake)
}

fn load(path: &Path, env: Environment) -> Result<Input, ConfigError> {
    let builder = Config::builder().add_source(File::from(path).required(true)).add_source(env);

    info!("Loading settings input from {}", path.display());

    let value = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<Value>()
        .context("Failed to deserialize config")?;

    Input::try_from(value).map_err(|other| ConfigError::Shape {
        message: format!("expected a table, got {other}").into(),
        context: Some(path.display().to_string().into()),
    })
}
