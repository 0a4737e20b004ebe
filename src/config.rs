/// Client configuration from environment variables
///
/// Controls which ledger service the client talks to, how long a single
/// call may take, and how many blocks the explorer shows.

use std::env;
use std::time::Duration;

const DEFAULT_LEDGER_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RECENT_BLOCKS: usize = 5;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the ledger service, without a trailing slash
    pub ledger_url: String,
    /// Transport timeout applied to every call
    pub request_timeout: Duration,
    /// Number of most recent blocks the explorer renders
    pub recent_blocks: usize,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LEDGER_URL`: ledger service endpoint (default `http://localhost:5000`)
    /// - `LEDGER_TIMEOUT_SECS`: per-call timeout in seconds (default 30)
    /// - `EXPLORER_RECENT_BLOCKS`: blocks shown by the explorer (default 5)
    ///
    /// # Examples
    ///
    /// ```bash
    /// # Talk to a local mock ledger
    /// LEDGER_URL=http://127.0.0.1:5000 cargo run --bin ledger-console
    /// ```
    pub fn from_env() -> Self {
        let ledger_url = env::var("LEDGER_URL")
            .map(|url| normalize_url(&url))
            .unwrap_or_else(|_| DEFAULT_LEDGER_URL.to_string());
        log::info!("📡 Ledger URL: {}", ledger_url);

        let timeout_secs = parse_or_default("LEDGER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let recent_blocks = parse_or_default("EXPLORER_RECENT_BLOCKS", DEFAULT_RECENT_BLOCKS);

        Self {
            ledger_url,
            request_timeout: Duration::from_secs(timeout_secs),
            recent_blocks,
        }
    }

    /// Same defaults, pointed at another ledger
    pub fn with_ledger_url(url: &str) -> Self {
        Self {
            ledger_url: normalize_url(url),
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ledger_url: DEFAULT_LEDGER_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            recent_blocks: DEFAULT_RECENT_BLOCKS,
        }
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("⚠️  Invalid {}='{}', using default {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}
