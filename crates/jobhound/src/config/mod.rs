use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub paths: PathConfig,
    pub http: HttpConfig,
    pub pacing: PacingConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("JOBHOUND_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let paths = PathConfig {
            store: path_var("JOBHOUND_STORE_PATH", "files/output/main.csv"),
            history: path_var("JOBHOUND_HISTORY_PATH", "files/output/scraped_urls.txt"),
            profile: path_var("JOBHOUND_PROFILE_PATH", "files/user_info.json"),
        };

        let timeout_secs = parse_var("JOBHOUND_REQUEST_TIMEOUT_SECS", 30)
            .map_err(|_| ConfigError::InvalidTimeout)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let user_agent = env::var("JOBHOUND_USER_AGENT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let (default_min, default_max) = match environment {
            AppEnvironment::Test => (0, 0),
            _ => (50, 1000),
        };
        let min_delay_ms = parse_var("JOBHOUND_MIN_DELAY_MS", default_min)
            .map_err(|_| ConfigError::InvalidDelay)?;
        let max_delay_ms = parse_var("JOBHOUND_MAX_DELAY_MS", default_max)
            .map_err(|_| ConfigError::InvalidDelay)?;
        if min_delay_ms > max_delay_ms {
            return Err(ConfigError::DelayRange {
                min: min_delay_ms,
                max: max_delay_ms,
            });
        }

        let log_level = env::var("JOBHOUND_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            paths,
            http: HttpConfig {
                request_timeout: Duration::from_secs(timeout_secs),
                user_agent,
            },
            pacing: PacingConfig {
                min_delay: Duration::from_millis(min_delay_ms),
                max_delay: Duration::from_millis(max_delay_ms),
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

fn path_var(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}

fn parse_var(key: &str, default: u64) -> Result<u64, std::num::ParseIntError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>(),
        Err(_) => Ok(default),
    }
}

/// Locations of the flat files the tool reads and writes.
#[derive(Debug, Clone)]
pub struct PathConfig {
    pub store: PathBuf,
    pub history: PathBuf,
    pub profile: PathBuf,
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

/// Bounds for the randomized pause between outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl PacingConfig {
    pub const fn disabled() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTimeout,
    InvalidDelay,
    DelayRange { min: u64, max: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTimeout => write!(
                f,
                "JOBHOUND_REQUEST_TIMEOUT_SECS must be a positive number of seconds"
            ),
            ConfigError::InvalidDelay => write!(
                f,
                "JOBHOUND_MIN_DELAY_MS and JOBHOUND_MAX_DELAY_MS must be whole milliseconds"
            ),
            ConfigError::DelayRange { min, max } => write!(
                f,
                "JOBHOUND_MIN_DELAY_MS ({min}) must not exceed JOBHOUND_MAX_DELAY_MS ({max})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
