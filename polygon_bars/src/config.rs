//! Client configuration, read from the environment at the process edge.
//!
//! The session timezone drives the search window calendar math and is an
//! explicit value here rather than ambient process state, so tests can
//! inject arbitrary reference zones.

use std::path::PathBuf;

use chrono_tz::Tz;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "POLYGON_API_KEY";

/// Environment variable holding the cache root directory (optional).
pub const CACHE_DIR_VAR: &str = "POLYGON_CACHE_DIR";

/// Environment variable overriding the session timezone (optional).
pub const SESSION_TZ_VAR: &str = "POLYGON_SESSION_TZ";

const DEFAULT_BASE_URL: &str = "https://api.polygon.io";

/// Errors related to client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the client is not set.
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    /// A timezone name did not parse as an IANA zone.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Reads an environment variable, returning a structured error if it's
/// missing.
fn get_env_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Everything a [`PolygonClient`](crate::providers::polygon::PolygonClient)
/// needs: credential, base URL, optional cache root, session timezone.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credential, appended to every request as the `apiKey` query
    /// parameter.
    pub api_key: SecretString,

    /// Scheme and host of the REST API.
    pub base_url: Url,

    /// Root of the on-disk response cache. `None` disables caching.
    pub cache_dir: Option<PathBuf>,

    /// Trading-session timezone for search window calendar math.
    pub session_tz: Tz,
}

impl ClientConfig {
    /// Configuration with defaults: production base URL, no cache,
    /// New York sessions.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into().into()),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL parses"),
            cache_dir: None,
            session_tz: chrono_tz::America::New_York,
        }
    }

    /// Configuration from the environment: `POLYGON_API_KEY` (required),
    /// `POLYGON_CACHE_DIR` and `POLYGON_SESSION_TZ` (optional).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(get_env_var(API_KEY_VAR)?);
        if let Ok(dir) = std::env::var(CACHE_DIR_VAR) {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Ok(name) = std::env::var(SESSION_TZ_VAR) {
            config.session_tz = name
                .parse()
                .map_err(|_| ConfigError::InvalidTimezone(name))?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_session_tz(mut self, tz: Tz) -> Self {
        self.session_tz = tz;
        self
    }
}
