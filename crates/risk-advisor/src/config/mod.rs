use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::cases::access::{
    is_four_digit_code, DEFAULT_ADMIN_PASSCODE, DEFAULT_REVIEWER_CODE,
};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment stage, read from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(raw: Option<String>) -> Self {
        let raw = raw.unwrap_or_default();
        match raw.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the service and CLI read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub advisor: AdvisorConfig,
}

impl AppConfig {
    /// Reads `.env` when present, then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::parse(read_var("APP_ENV")),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: read_var("APP_LOG_LEVEL")
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
            advisor: AdvisorConfig::from_env()?,
        })
    }
}

/// Trimmed value of `key`; unset and blank both read as `None`.
fn read_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = match read_var("APP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: raw })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: read_var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// Resolves the bind address; `localhost` maps to the IPv4 loopback.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost {
                    host: self.host.clone(),
                    source,
                })?
        };

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Secrets and storage locations for the case workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    pub admin_passcode: String,
    pub reviewer_code: String,
    /// JSON snapshot of stored cases; in-memory only when unset.
    pub case_store: Option<PathBuf>,
    /// Where the reviewer code is saved after an admin changes it.
    pub access_file: Option<PathBuf>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            admin_passcode: DEFAULT_ADMIN_PASSCODE.to_string(),
            reviewer_code: DEFAULT_REVIEWER_CODE.to_string(),
            case_store: None,
            access_file: None,
        }
    }
}

impl AdvisorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let admin_passcode =
            read_var("ADVISOR_ADMIN_PASSCODE").unwrap_or_else(|| DEFAULT_ADMIN_PASSCODE.to_string());
        let reviewer_code =
            read_var("ADVISOR_REVIEWER_CODE").unwrap_or_else(|| DEFAULT_REVIEWER_CODE.to_string());

        if !is_four_digit_code(&admin_passcode) {
            return Err(ConfigError::InvalidSecret {
                key: "ADVISOR_ADMIN_PASSCODE",
            });
        }
        if !is_four_digit_code(&reviewer_code) {
            return Err(ConfigError::InvalidSecret {
                key: "ADVISOR_REVIEWER_CODE",
            });
        }

        Ok(Self {
            admin_passcode,
            reviewer_code,
            case_store: read_var("ADVISOR_CASE_STORE").map(PathBuf::from),
            access_file: read_var("ADVISOR_ACCESS_FILE").map(PathBuf::from),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort {
        value: String,
    },
    InvalidHost {
        host: String,
        source: std::net::AddrParseError,
    },
    InvalidSecret {
        key: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort { value } => {
                write!(f, "APP_PORT '{value}' is not a port number")
            }
            ConfigError::InvalidHost { host, .. } => {
                write!(f, "APP_HOST '{host}' is not an IP address or localhost")
            }
            ConfigError::InvalidSecret { key } => write!(f, "{key} must be exactly 4 digits"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source, .. } => Some(source),
            ConfigError::InvalidPort { .. } | ConfigError::InvalidSecret { .. } => None,
        }
    }
}
