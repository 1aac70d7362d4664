use std::path::Path;

use anyhow::Result;
use campus_engine::EngineConfig;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// Layer defaults, then the TOML file, then `CAMPUS_*` environment variables.
    ///
    /// Without `--config`, `campus.toml` in the working directory is read if present.
    /// Nested keys use a double underscore, e.g. `CAMPUS_ENGINE__TIMEZONE`.
    ///
    /// # Errors
    /// Returns an error if an explicit file is missing or a value does not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("campus.toml").required(false),
        };

        Ok(Config::builder()
            .set_default("logging.level", "warn")?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("CAMPUS")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// Load `.env` (if any) into the environment, then the layered settings.
///
/// # Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load(path)
}
