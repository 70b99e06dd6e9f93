use std::env;
use tracing::warn;

pub const DEFAULT_FEED_URL: &str = "https://cap-alerts.s3.amazonaws.com/unfiltered/rss.xml";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed_url: String,
    pub host: String,
    pub port: u16,
    /// Maximum number of alert documents fetched at once; `None` fans out to every item.
    pub fetch_concurrency: Option<usize>,
    pub log_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            fetch_concurrency: None,
            log_dir: DEFAULT_LOG_DIR.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any variable source. Blank values are treated as unset and
    /// malformed numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                warn!("Invalid PORT value '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let fetch_concurrency = get("FETCH_CONCURRENCY").and_then(|raw| match raw.parse::<usize>() {
            Ok(limit) if limit > 0 => Some(limit),
            _ => {
                warn!("Invalid FETCH_CONCURRENCY value '{}', fetching without a limit", raw);
                None
            }
        });

        Self {
            feed_url: get("CAP_FEED_URL").unwrap_or(defaults.feed_url),
            host: get("HOST").unwrap_or(defaults.host),
            port,
            fetch_concurrency,
            log_dir: get("LOG_DIR").unwrap_or(defaults.log_dir),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log directory, needed before the rest of the config so that config warnings are recorded.
pub fn log_dir() -> String {
    env::var("LOG_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())
}
