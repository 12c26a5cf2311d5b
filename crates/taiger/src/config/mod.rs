use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::student::{LockPolicy, TaskFlags, MAX_STALE_AFTER_DAYS};

/// Distinguishes runtime behavior for different stages of the service.
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
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub lock: LockPolicy,
    pub features: TaskFlags,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let include_target = flag("APP_LOG_TARGET", false)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_target,
            },
            lock: lock_policy()?,
            features: TaskFlags {
                vpd_enable: flag("APP_VPD_ENABLE", false)?,
                meeting_enable: flag("APP_MEETING_ENABLE", false)?,
            },
        })
    }
}

fn lock_policy() -> Result<LockPolicy, ConfigError> {
    let defaults = LockPolicy::default();

    let stale_after_days = match env::var("APP_PROGRAM_STALE_DAYS") {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(days) if (1..=MAX_STALE_AFTER_DAYS).contains(&days) => days,
            _ => return Err(ConfigError::InvalidStaleDays { value: raw }),
        },
        Err(_) => defaults.stale_after_days(),
    };

    let policy = match env::var("APP_APPROVAL_COUNTRIES") {
        Ok(raw) => LockPolicy::new(raw.split(','), stale_after_days),
        Err(_) => LockPolicy::new(defaults.approval_countries(), stale_after_days),
    };

    Ok(policy)
}

fn flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value: raw }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub include_target: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStaleDays { value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStaleDays { value } => write!(
                f,
                "APP_PROGRAM_STALE_DAYS must be between 1 and {MAX_STALE_AFTER_DAYS} days, got '{value}'"
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStaleDays { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::student::DEFAULT_STALE_AFTER_DAYS;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_TARGET",
            "APP_APPROVAL_COUNTRIES",
            "APP_PROGRAM_STALE_DAYS",
            "APP_VPD_ENABLE",
            "APP_MEETING_ENABLE",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.lock, LockPolicy::default());
        assert_eq!(config.lock.stale_after_days(), DEFAULT_STALE_AFTER_DAYS);
        assert_eq!(config.features, TaskFlags::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_lock_policy_and_feature_flags() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_APPROVAL_COUNTRIES", " DE , fr,,");
        env::set_var("APP_PROGRAM_STALE_DAYS", "90");
        env::set_var("APP_VPD_ENABLE", "true");
        env::set_var("APP_MEETING_ENABLE", "0");

        let config = AppConfig::load().expect("config loads");

        assert!(config.lock.is_approval_country(Some("de")));
        assert!(config.lock.is_approval_country(Some("FR")));
        assert!(!config.lock.is_approval_country(Some("us")));
        assert_eq!(config.lock.stale_after_days(), 90);
        assert!(config.features.vpd_enable);
        assert!(!config.features.meeting_enable);
        reset_env();
    }

    #[test]
    fn rejects_invalid_stale_threshold_and_flags() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        for value in ["-5", "0", "36501", "4611686018427387903"] {
            env::set_var("APP_PROGRAM_STALE_DAYS", value);
            assert!(
                matches!(AppConfig::load(), Err(ConfigError::InvalidStaleDays { .. })),
                "{value} should be rejected"
            );
        }

        reset_env();
        env::set_var("APP_VPD_ENABLE", "maybe");
        match AppConfig::load() {
            Err(ConfigError::InvalidFlag { name, .. }) => assert_eq!(name, "APP_VPD_ENABLE"),
            other => panic!("expected invalid flag error, got {other:?}"),
        }
        reset_env();
    }
}
