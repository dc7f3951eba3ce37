use std::env;
use std::fmt;

use auth::TokenLifetime;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_hours: i64,
    pub refresh_token_hours: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_hours", &self.access_token_hours)
            .field("refresh_token_hours", &self.refresh_token_hours)
            .finish()
    }
}

/// Persistence settings. Without a URL the service keeps users in memory.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. `JWT_SECRET` and `PORT`
    /// 2. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, DATABASE__URL, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    ///
    /// A missing or empty `jwt.secret` is an error: the service must not start without it.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8080)?
            .set_default("jwt.access_token_hours", 24)?
            .set_default("jwt.refresh_token_hours", 168)?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__").try_parsing(true))
            .set_override_option("jwt.secret", env::var("JWT_SECRET").ok())?
            .set_override_option("server.http_port", env::var("PORT").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        for (key, hours) in [
            ("jwt.access_token_hours", self.jwt.access_token_hours),
            ("jwt.refresh_token_hours", self.jwt.refresh_token_hours),
        ] {
            TokenLifetime::from_hours(hours)
                .map_err(|e| ConfigError::Message(format!("{}: {}", key, e)))?;
        }
        Ok(())
    }
}
