//! # Configuration
//!
//! Startup configuration for logging and the CORS whitelist, read from YAML
//! with environment overrides:
//!
//! ```yaml
//! logging:
//!   level: debug
//!   format: pretty
//! cors:
//!   whitelist: ["http://localhost"]
//!   allowed_methods: [GET, POST]
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `ROUTEPLATE_LOG_LEVEL` | `logging.level` |
//! | `ROUTEPLATE_LOG_FORMAT` | `logging.format` |
//! | `ROUTEPLATE_CORS_WHITELIST` | `cors.whitelist` (comma-separated) |

use std::env;
use std::path::Path;

use http::Method;
use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::logging::LogConfig;
use crate::middleware::CorsMiddleware;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub logging: LogConfig,
    pub cors: CorsConfig,
}

/// CORS settings. An empty whitelist disables the middleware.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub whitelist: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            whitelist: vec!["*".to_string()],
            allowed_methods: ["GET", "POST", "PUT", "DELETE"].map(String::from).to_vec(),
            allowed_headers: ["X-Requested-With", "Content-Type", "Ajax"]
                .map(String::from)
                .to_vec(),
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    /// Build the middleware, or `None` when the whitelist is empty.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidMethod`] for an unparsable method name.
    pub fn build(&self) -> Result<Option<CorsMiddleware>, ConfigError> {
        if self.whitelist.is_empty() {
            return Ok(None);
        }
        let methods = self
            .allowed_methods
            .iter()
            .map(|m| {
                Method::from_bytes(m.trim().to_uppercase().as_bytes())
                    .map_err(|_| ConfigError::InvalidMethod(m.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let headers: Vec<&str> = self.allowed_headers.iter().map(String::as_str).collect();

        Ok(Some(
            CorsMiddleware::new(self.whitelist.iter().cloned())
                .allowed_methods(&methods)
                .allowed_headers(&headers)
                .allow_credentials(self.allow_credentials),
        ))
    }
}

impl RouterConfig {
    /// # Errors
    ///
    /// [`ConfigError::Yaml`] when the document does not parse.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] or [`ConfigError::Yaml`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&text)?;
        config.apply_env_overrides();
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        self.logging.apply_env_overrides();
        if let Ok(list) = env::var("ROUTEPLATE_CORS_WHITELIST") {
            self.cors.whitelist = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }
}
