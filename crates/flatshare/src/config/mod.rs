use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::listings::MessagingChannel;

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
    pub listings: ListingConfig,
    pub contact: ContactConfig,
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

        let default_page_size = page_size_var(
            "APP_LISTING_PAGE_SIZE",
            ListingConfig::DEFAULT_PAGE_SIZE,
        )?;
        let max_page_size =
            page_size_var("APP_LISTING_MAX_PAGE_SIZE", ListingConfig::MAX_PAGE_SIZE)?;

        let platform_name = env::var("APP_PLATFORM_NAME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| ContactConfig::DEFAULT_PLATFORM_NAME.to_string());
        let default_channel = match env::var("APP_MESSAGING_CHANNEL") {
            Ok(raw) => raw
                .parse::<MessagingChannel>()
                .map_err(|_| ConfigError::InvalidChannel { value: raw })?,
            Err(_) => MessagingChannel::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            listings: ListingConfig {
                default_page_size: default_page_size.min(max_page_size),
                max_page_size,
            },
            contact: ContactConfig {
                platform_name,
                default_channel,
            },
        })
    }
}

fn page_size_var(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidPageSize { variable: name }),
        },
        Err(_) => Ok(default),
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
}

/// Paging bounds for listing searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl ListingConfig {
    pub const DEFAULT_PAGE_SIZE: usize = 10;
    pub const MAX_PAGE_SIZE: usize = 100;
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page_size: Self::DEFAULT_PAGE_SIZE,
            max_page_size: Self::MAX_PAGE_SIZE,
        }
    }
}

/// Contact handoff rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactConfig {
    pub platform_name: String,
    pub default_channel: MessagingChannel,
}

impl ContactConfig {
    pub const DEFAULT_PLATFORM_NAME: &'static str = "Flatmate Finder";
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            platform_name: Self::DEFAULT_PLATFORM_NAME.to_string(),
            default_channel: MessagingChannel::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPageSize { variable: &'static str },
    InvalidChannel { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPageSize { variable } => {
                write!(f, "{variable} must be a positive integer")
            }
            ConfigError::InvalidChannel { value } => write!(
                f,
                "APP_MESSAGING_CHANNEL must be 'whatsapp' or 'sms' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidPageSize { .. }
            | ConfigError::InvalidChannel { .. } => None,
        }
    }
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LISTING_PAGE_SIZE");
        env::remove_var("APP_LISTING_MAX_PAGE_SIZE");
        env::remove_var("APP_PLATFORM_NAME");
        env::remove_var("APP_MESSAGING_CHANNEL");
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
        assert_eq!(config.listings, ListingConfig::default());
        assert_eq!(config.contact, ContactConfig::default());
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
    fn reads_listing_and_contact_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LISTING_PAGE_SIZE", "25");
        env::set_var("APP_LISTING_MAX_PAGE_SIZE", "20");
        env::set_var("APP_PLATFORM_NAME", "RoomBuddy");
        env::set_var("APP_MESSAGING_CHANNEL", "SMS");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.listings.max_page_size, 20);
        assert_eq!(config.listings.default_page_size, 20);
        assert_eq!(config.contact.platform_name, "RoomBuddy");
        assert_eq!(config.contact.default_channel, MessagingChannel::Sms);
        reset_env();
    }

    #[test]
    fn rejects_invalid_page_size_and_channel() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LISTING_PAGE_SIZE", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPageSize {
                variable: "APP_LISTING_PAGE_SIZE"
            })
        ));

        reset_env();
        env::set_var("APP_MESSAGING_CHANNEL", "pigeon");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidChannel { .. })
        ));
        reset_env();
    }
}
