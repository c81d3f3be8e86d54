use crate::error::ConfigError;
use config::builder::DefaultState;
use config::ConfigBuilder;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{Config, DatabaseSettings, LoggingSettings, SearchSettings};

/// Loads the application configuration.
///
/// Reads `config.toml` from the working directory when it exists, then layers
/// `LIGHTBNB__<SECTION>__<KEY>` environment variables on top (for example
/// `LIGHTBNB__DATABASE__MAX_CONNECTIONS=20`). The result is validated before
/// it is returned.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("LIGHTBNB")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    from_builder(builder)
}

fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
