//! # pb-config
//!
//! Layered settings: built-in defaults, then an optional `paperboard.toml`,
//! then `PAPERBOARD__SECTION__KEY` environment variables (a `.env` file is
//! loaded first if present).

use config::{Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// Cookie signing keys must carry at least this many bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub news: NewsSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self { url: "sqlite:paperboard.db".into() }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SessionSettings {
    /// Cookie key material; a random key is generated when absent, which
    /// logs everyone out on restart.
    pub secret: Option<SecretString>,
    /// Send the cookie over HTTPS only.
    pub secure_cookie: bool,
}

impl SessionSettings {
    pub fn secret_bytes(&self) -> Option<&[u8]> {
        self.secret.as_ref().map(|s| s.expose_secret().as_bytes())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    /// Cap on the news home page.
    pub per_page: i64,
    /// Case-insensitive substrings rejected in comments.
    pub bad_words: Vec<String>,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            per_page: 10,
            bad_words: vec!["редиска".into(), "негодяй".into()],
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw = config::Config::builder()
            .add_source(File::with_name("paperboard").required(false))
            .add_source(
                Environment::with_prefix("PAPERBOARD")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("news.bad_words"),
            )
            .build()?;

        let settings: Self = raw.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(?settings, "configuration loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.news.per_page < 1 {
            return Err(ConfigError::Invalid("news.per_page must be at least 1".into()));
        }
        if let Some(secret) = self.session.secret_bytes() {
            if secret.len() < MIN_SESSION_SECRET_LEN {
                return Err(ConfigError::Invalid(format!(
                    "session.secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
                )));
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
