//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads an optional `.env` file first.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use storefront_core::{PricingError, PricingTable};

/// 20 MB, large enough for an inline image reference.
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Listen address (`STOREFRONT_BIND_ADDR`)
    pub bind_addr: String,

    /// Listen port (`PORT`)
    pub port: u16,

    /// SQLite file (`STOREFRONT_DB_PATH`)
    pub db_path: PathBuf,

    /// Pool size (`STOREFRONT_DB_MAX_CONNECTIONS`)
    pub db_max_connections: u32,

    /// Optional TOML rule-table override (`STOREFRONT_PRICING_RULES`)
    pub pricing_rules_path: Option<PathBuf>,

    /// Max JSON body size in bytes (`STOREFRONT_BODY_LIMIT_BYTES`)
    pub body_limit_bytes: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = ApiConfig {
            bind_addr: value("STOREFRONT_BIND_ADDR", "0.0.0.0"),

            port: value("PORT", "3001")
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            db_path: PathBuf::from(value("STOREFRONT_DB_PATH", "./storefront.db")),

            db_max_connections: value("STOREFRONT_DB_MAX_CONNECTIONS", "5")
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("STOREFRONT_DB_MAX_CONNECTIONS".to_string()))?,

            pricing_rules_path: lookup("STOREFRONT_PRICING_RULES")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),

            body_limit_bytes: match lookup("STOREFRONT_BODY_LIMIT_BYTES") {
                Some(v) if !v.trim().is_empty() => v
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("STOREFRONT_BODY_LIMIT_BYTES".to_string()))?,
                _ => DEFAULT_BODY_LIMIT_BYTES,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOREFRONT_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// The address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("STOREFRONT_BIND_ADDR".to_string()))
    }

    /// Builds the pricing table: built-in, or the rule file layered over it.
    pub fn load_pricing(&self) -> Result<PricingTable, ConfigError> {
        let Some(path) = &self.pricing_rules_path else {
            return Ok(PricingTable::builtin());
        };

        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(PricingTable::from_toml_str(&source)?)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error(transparent)]
    PricingRules(#[from] PricingError),
}
