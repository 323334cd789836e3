use crate::error::ConfigError;
use crate::settings::Settings;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use settings::{ApplicationSettings, DatabaseSettings, Environment, LoggingSettings};
pub use telemetry::init_tracing;

/// Loads the application configuration from `config.toml` in the working directory.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the application configuration from `path`.
///
/// Sources, lowest precedence first: built-in defaults, the file (optional),
/// `APP__SECTION__KEY` environment variables, and finally `DATABASE_URL`
/// (read after loading any `.env` file). The result is validated before it is returned.
pub fn load_config_from(path: &Path) -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    let settings = build(path, std::env::var("DATABASE_URL").ok())?;
    settings.validate()?;
    Ok(settings)
}

fn build(path: &Path, database_url: Option<String>) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("database.url", database_url)?
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = build(Path::new("does-not-exist.toml"), None).unwrap();
        assert_eq!(settings.application.port, 3000);
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.application.view_cache_capacity, 256);
        assert_eq!(settings.application.environment, Environment::Development);
        assert!(settings.logging.directory.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let file = toml_file(
            r#"
            [application]
            port = 8080
            environment = "production"

            [database]
            max_connections = 3
            "#,
        );
        let settings = build(file.path(), None).unwrap();
        assert_eq!(settings.application.port, 8080);
        assert!(settings.application.environment.is_production());
        assert_eq!(settings.database.max_connections, 3);
        assert_eq!(settings.database.acquire_timeout_secs, 5);
    }

    #[test]
    fn database_url_override_wins_over_file() {
        let file = toml_file(
            r#"
            [database]
            url = "postgres://file/db"
            "#,
        );
        let settings = build(file.path(), Some("postgres://env/db".to_string())).unwrap();
        assert_eq!(settings.database.url, "postgres://env/db");
    }

    #[test]
    fn validation_requires_a_database_url() {
        let settings = build(Path::new("does-not-exist.toml"), None).unwrap();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let settings = build(
            Path::new("does-not-exist.toml"),
            Some("postgres://localhost/dashboard".to_string()),
        )
        .unwrap();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn validation_rejects_an_empty_view_cache() {
        let file = toml_file(
            r#"
            [application]
            view_cache_capacity = 0
            "#,
        );
        let settings = build(file.path(), Some("postgres://localhost/db".to_string())).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validation_rejects_a_bad_host() {
        let file = toml_file(
            r#"
            [application]
            host = "not an ip"
            "#,
        );
        let settings = build(file.path(), Some("postgres://localhost/db".to_string())).unwrap();
        assert!(settings.validate().is_err());
    }
}
