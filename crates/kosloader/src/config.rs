/// Configuration loaded from the environment and the command line
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::kos::ConfigError;

/// Default KOS host.
pub const KOS_BASE_URL: &str = "https://kos.cvut.cz";

/// Number of parallels requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const ENV_USERNAME: &str = "KOS_USERNAME";
const ENV_PASSWORD: &str = "KOS_PASSWORD";
const ENV_LOG_LEVEL: &str = "LOGLEVEL";
const ENV_BASE_URL: &str = "KOS_BASE_URL";
const ENV_PAGE_SIZE: &str = "KOS_PAGE_SIZE";
const ENV_STAGGER_MS: &str = "KOS_STAGGER_MS";
const ENV_MAX_JITTER_MS: &str = "KOS_MAX_JITTER_MS";
const ENV_MAX_CONCURRENCY: &str = "KOS_MAX_CONCURRENCY";
const ENV_TIMEOUT_SECS: &str = "KOS_TIMEOUT_SECS";

/// KOS login credentials.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let username = lookup(ENV_USERNAME).ok_or(ConfigError::MissingEnv { name: ENV_USERNAME })?;
        let password = lookup(ENV_PASSWORD).ok_or(ConfigError::MissingEnv { name: ENV_PASSWORD })?;
        Ok(Self { username, password })
    }
}

/// Log verbosity accepted in `LOGLEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(ENV_LOG_LEVEL) {
            None => Ok(LogLevel::default()),
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_LOG_LEVEL,
                value,
            }),
        }
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(()),
        }
    }
}

/// Connection and scheduling settings for the KOS API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme and host of the KOS instance
    pub base_url: Url,
    /// Elements per page when paginating parallels
    pub page_size: u32,
    /// Delay added per page index before a page request fires
    pub stagger: Duration,
    /// Exclusive upper bound of the random delay before single-shot requests
    pub max_jitter: Duration,
    /// Maximum requests in flight, `None` for no limit
    pub max_concurrency: Option<usize>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(KOS_BASE_URL).expect("default base URL is valid"),
            page_size: DEFAULT_PAGE_SIZE,
            stagger: Duration::from_secs(1),
            max_jitter: Duration::from_secs(5),
            max_concurrency: None,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    /// Reads overrides from the environment, keeping defaults for unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BASE_URL) {
            config.base_url = Url::parse(&value)?;
        }
        if let Some(size) = parse_var::<u32>(&lookup, ENV_PAGE_SIZE)? {
            if size == 0 {
                return Err(ConfigError::InvalidEnv {
                    name: ENV_PAGE_SIZE,
                    value: size.to_string(),
                });
            }
            config.page_size = size;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_STAGGER_MS)? {
            config.stagger = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_MAX_JITTER_MS)? {
            config.max_jitter = Duration::from_millis(ms);
        }
        if let Some(limit) = parse_var::<usize>(&lookup, ENV_MAX_CONCURRENCY)? {
            config.max_concurrency = (limit > 0).then_some(limit);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECS)? {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Root of the REST API, e.g. `https://kos.cvut.cz/rest/api`.
    pub fn api_root(&self) -> String {
        format!("{}/rest/api", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Root of the login endpoints, e.g. `https://kos.cvut.cz/rest`.
    pub fn rest_root(&self) -> String {
        format!("{}/rest", self.base_url.as_str().trim_end_matches('/'))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { name, value }),
    }
}

/// Everything a loader run needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub log_level: LogLevel,
    pub output_path: PathBuf,
    pub api: ApiConfig,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env(output_path: PathBuf) -> Result<Self, ConfigError> {
        Self::from_lookup(output_path, |name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        output_path: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            credentials: Credentials::from_lookup(&lookup)?,
            log_level: LogLevel::from_lookup(&lookup)?,
            api: ApiConfig::from_lookup(&lookup)?,
            output_path,
        })
    }
}

/// Creates the parent directory of `path` if needed and checks the path names a file.
pub fn prepare_output_path(path: &Path) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::InvalidOutputPath {
        path: path.to_path_buf(),
        message,
    };

    if path.is_dir() {
        return Err(invalid("path is a directory".to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| invalid(e.to_string()))?;
    }

    Ok(())
}
