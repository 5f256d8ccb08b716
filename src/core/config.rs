use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str =
    "https://www.tori.fi/koko_suomi?q=guitar+hero&cg=0&w=3&st=s&st=g&ca=18&l=0&md=th";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub tori: ToriConfig,
    pub telegram: TelegramConfig,
    pub scanner: ScannerConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToriConfig {
    pub search_url: String,
    pub fetch_timeout_secs: u64,
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub user_id: String,
    pub api_url: String,
    pub timeout_secs: u64,
}

// The bot token is a credential; keep it out of `{:?}` output.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    pub posted_items_file: PathBuf,
    pub time_frame_minutes: i64,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub log_file: PathBuf,
    pub log_max_size_mb: u64,
    pub log_max_files: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            tori: ToriConfig {
                search_url: env::var("TORI_SEARCH_URL")
                    .unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string()),
                fetch_timeout_secs: parse_or("FETCH_TIMEOUT_SECS", 30),
            },
            telegram: TelegramConfig {
                bot_token: required("TELEGRAM_TOKEN")?,
                user_id: required("USER_ID")?,
                api_url: env::var("TELEGRAM_API_URL")
                    .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string()),
                timeout_secs: parse_or("NOTIFY_TIMEOUT_SECS", 30),
            },
            scanner: ScannerConfig {
                posted_items_file: env::var("POSTED_ITEMS_FILE")
                    .unwrap_or_else(|_| "posted_items.txt".to_string())
                    .into(),
                time_frame_minutes: parse_or("TIME_FRAME_MINUTES", 120),
                poll_interval_secs: parse_or("POLL_INTERVAL_SECS", 60),
            },
            monitoring: MonitoringConfig {
                log_level: env::var("LOG_LEVEL")
                    .unwrap_or_else(|_| "debug".to_string())
                    .to_lowercase(),
                log_file: env::var("LOG_FILE")
                    .unwrap_or_else(|_| "tori2telegram.log".to_string())
                    .into(),
                log_max_size_mb: parse_or("LOG_MAX_SIZE_MB", 10),
                log_max_files: parse_or("LOG_MAX_FILES", 3),
            },
        })
    }
}

impl ToriConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl TelegramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ScannerConfig {
    pub fn time_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.time_frame_minutes)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl MonitoringConfig {
    pub fn log_max_size_bytes(&self) -> u64 {
        self.log_max_size_mb * 1024 * 1024
    }
}

fn required(name: &'static str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(anyhow!("environment variable {name} not set")),
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
