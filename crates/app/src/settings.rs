//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory,
//! overridden by `TALLY__<SECTION>__<KEY>` environment variables, e.g.
//! `TALLY__SERVER__JWT_SECRET`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_cost: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(
                    Environment::with_prefix("TALLY")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .set_default("app.level", "info")?
            .set_default("server.port", 8080)?
            .set_default("server.database", "memory")?
            .set_default("server.token_ttl_hours", 24)?
            .build()?
            .try_deserialize()?;

        if settings.server.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "server.jwt_secret must not be empty".to_string(),
            ));
        }
        if settings.server.token_ttl_hours <= 0 {
            return Err(ConfigError::Message(
                "server.token_ttl_hours must be positive".to_string(),
            ));
        }
        Ok(settings)
    }
}
