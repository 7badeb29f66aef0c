use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::grants::fees::{FeeSchedule, FeeScheduleError};

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
    pub catalog: CatalogConfig,
    pub fees: FeeSchedule,
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

        let grants_path = env::var("APP_GRANTS_PATH")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            catalog: CatalogConfig { grants_path },
            fees: load_fee_schedule()?,
        })
    }
}

fn load_fee_schedule() -> Result<FeeSchedule, ConfigError> {
    let standard = FeeSchedule::STANDARD;

    let rate = match env::var("APP_FEE_RATE") {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidFeeSetting("APP_FEE_RATE"))?,
        Err(_) => standard.rate,
    };
    let minimum = match env::var("APP_FEE_MINIMUM") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidFeeSetting("APP_FEE_MINIMUM"))?,
        Err(_) => standard.minimum,
    };
    let maximum = match env::var("APP_FEE_MAXIMUM") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidFeeSetting("APP_FEE_MAXIMUM"))?,
        Err(_) => standard.maximum,
    };

    Ok(FeeSchedule::new(rate, minimum, maximum)?)
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
    pub ansi: bool,
}

/// Where the grant catalog is seeded from.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    pub grants_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{0} must be numeric")]
    InvalidFeeSetting(&'static str),
    #[error("invalid fee schedule: {0}")]
    FeeSchedule(#[from] FeeScheduleError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_GRANTS_PATH",
            "APP_FEE_RATE",
            "APP_FEE_MINIMUM",
            "APP_FEE_MAXIMUM",
        ] {
            env::remove_var(key);
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
        assert!(config.catalog.grants_path.is_none());
        assert_eq!(config.fees, FeeSchedule::STANDARD);
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
    fn fee_overrides_are_validated() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_FEE_MINIMUM", "50");
        env::set_var("APP_FEE_MAXIMUM", "500");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.fees.minimum, 50);
        assert_eq!(config.fees.maximum, 500);
        assert_eq!(config.fees.rate, FeeSchedule::STANDARD.rate);

        env::set_var("APP_FEE_MINIMUM", "900");
        env::set_var("APP_FEE_MAXIMUM", "100");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::FeeSchedule(FeeScheduleError::InvertedBounds { .. }))
        ));

        env::set_var("APP_FEE_RATE", "half");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFeeSetting("APP_FEE_RATE"))
        ));
        reset_env();
    }
}
