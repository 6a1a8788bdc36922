//! Configuration module for tubecache.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubecache::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Backend: {}", config.source.backend.as_str());
//! println!("Workers: {}", config.catalog.pool_workers());
//! ```

mod catalog;
mod error;
mod logging;
mod parse;
mod source;

pub use catalog::{CatalogConfig, BATCH_SIZE, DEFAULT_MAX_VIDEOS};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use parse::parse_duration;
pub use source::{Backend, SourceConfig, DEFAULT_SEARCH_RESULTS};

/// Complete application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Catalog limits (playlist cap, pool size, cache capacity).
    pub catalog: CatalogConfig,
    /// Data source selection and HTTP settings.
    pub source: SourceConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            catalog: CatalogConfig::from_env()?,
            source: SourceConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Backend: {}", self.source.backend.as_str());
        info!("  Pool workers: {}", self.catalog.pool_workers());
        info!("  Cache capacity: {}", self.catalog.cache_capacity());
        info!("  Playlist max videos: {}", self.catalog.max_videos());
        info!("  Search results: {}", self.source.search_results);

        match self.source.request_timeout {
            Some(timeout) => info!("  Request timeout: {}ms", timeout.as_millis()),
            None => info!("  Request timeout: disabled"),
        }

        if let Some(ref proxy) = self.source.proxy {
            info!("  Proxy: {}", proxy);
        }
    }
}
