//! Data source configuration.

use std::path::PathBuf;
use std::time::Duration;

use super::parse::{env_duration, env_nonzero, env_opt, env_or};
use super::ConfigError;

/// Default number of search hits requested from the API backend.
pub const DEFAULT_SEARCH_RESULTS: usize = 15;

/// Backend used to fetch metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Backend {
    /// YouTube Data API v3 (fast, needs an API key).
    Api,
    /// HTML scraping (slow, no key needed).
    #[default]
    Scrape,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Api => "api",
            Backend::Scrape => "scrape",
        }
    }
}

/// Data source configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Backend selection.
    pub backend: Backend,
    /// API key for the `api` backend.
    pub api_key: Option<String>,
    /// Number of hits requested per search.
    pub search_results: usize,
    /// Per-request timeout (None = no timeout).
    pub request_timeout: Option<Duration>,
    /// Proxy URL applied to all requests.
    pub proxy: Option<String>,
    /// User agent sent with every request.
    pub user_agent: String,
    /// yt-dlp executable used for audio stream resolution.
    pub ytdlp_path: PathBuf,
}

impl SourceConfig {
    /// Load configuration from environment variables.
    ///
    /// The backend defaults to `api` when `YOUTUBE_API_KEY` is set and to
    /// `scrape` otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_opt("YOUTUBE_API_KEY");
        let backend = match env_opt("YOUTUBE_BACKEND") {
            Some(value) => Self::parse_backend(&value)?,
            None if api_key.is_some() => Backend::Api,
            None => Backend::Scrape,
        };

        if backend == Backend::Api && api_key.is_none() {
            return Err(ConfigError::Missing {
                key: "YOUTUBE_API_KEY".into(),
            });
        }

        Ok(Self {
            backend,
            api_key,
            search_results: env_nonzero("SEARCH_RESULTS", DEFAULT_SEARCH_RESULTS)?,
            request_timeout: env_duration("REQUEST_TIMEOUT", "10s")?,
            proxy: env_opt("PROXY_URL"),
            user_agent: env_or("USER_AGENT", &default_user_agent()),
            ytdlp_path: PathBuf::from(env_or("YTDLP_PATH", "yt-dlp")),
        })
    }

    fn parse_backend(value: &str) -> Result<Backend, ConfigError> {
        match value.to_lowercase().as_str() {
            "api" => Ok(Backend::Api),
            "scrape" => Ok(Backend::Scrape),
            other => Err(ConfigError::Invalid {
                key: "YOUTUBE_BACKEND".into(),
                message: format!("expected 'api' or 'scrape', got '{}'", other),
            }),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            api_key: None,
            search_results: DEFAULT_SEARCH_RESULTS,
            request_timeout: Some(Duration::from_secs(10)),
            proxy: None,
            user_agent: default_user_agent(),
            ytdlp_path: PathBuf::from("yt-dlp"),
        }
    }
}

fn default_user_agent() -> String {
    format!("tubecache/{}", crate::PKG_VERSION)
}
