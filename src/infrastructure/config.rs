//! # Application Configuration
//!
//! Layered configuration for the service.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional file: `$FLIGHTS_CONFIG` if set, otherwise `config.{toml,yaml,json}`
//!    from `.`, `./config` or `/etc/flights`
//! 3. Environment variables prefixed `FLIGHTS`, nested with `__`
//!    (`FLIGHTS__SEARCH__TIMEOUT_MS=5000`)
//!
//! A `.env` file in the working directory is loaded into the environment
//! first.
//!
//! # Examples
//!
//! ```ignore
//! use flight_aggregator::infrastructure::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("listening on {}", config.server.bind_addr);
//! ```

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FLIGHTS";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FLIGHTS_CONFIG";

/// Provider names accepted in `providers.enabled`.
pub const KNOWN_PROVIDERS: [&str; 4] = ["amadeus", "duffel", "rapid-booking", "mock"];

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates a validation error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Seconds to wait for in-flight requests on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            shutdown_grace_secs: 10,
        }
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Per-query fan-out deadline.
    pub timeout_ms: u64,
    /// Lifetime of cached results.
    pub cache_ttl_ms: u64,
    /// Push interval for streaming connections.
    pub stream_interval_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            cache_ttl_ms: 30_000,
            stream_interval_ms: 30_000,
        }
    }
}

impl SearchSettings {
    /// Returns the search timeout.
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the cache TTL.
    #[inline]
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Returns the streaming interval.
    #[inline]
    #[must_use]
    pub fn stream_interval(&self) -> Duration {
        Duration::from_millis(self.stream_interval_ms)
    }
}

/// Login and token settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret. Required.
    pub jwt_secret: String,
    /// Accepted login name.
    pub username: String,
    /// Accepted login password.
    pub password: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            username: "demo".to_string(),
            password: "demo123".to_string(),
            token_ttl_secs: 3600,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Amadeus adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmadeusSettings {
    /// API root, without trailing slash.
    pub base_url: String,
    /// OAuth client id.
    pub client_id: Option<String>,
    /// OAuth client secret.
    pub client_secret: Option<String>,
}

impl Default for AmadeusSettings {
    fn default() -> Self {
        Self {
            base_url: "https://test.api.amadeus.com".to_string(),
            client_id: None,
            client_secret: None,
        }
    }
}

/// Duffel adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DuffelSettings {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Bearer access token.
    pub token: Option<String>,
}

impl Default for DuffelSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.duffel.com".to_string(),
            token: None,
        }
    }
}

/// RapidAPI Booking adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RapidBookingSettings {
    /// API root, without trailing slash. Its host is sent as `X-RapidAPI-Host`.
    pub base_url: String,
    /// RapidAPI key.
    pub api_key: Option<String>,
}

impl Default for RapidBookingSettings {
    fn default() -> Self {
        Self {
            base_url: "https://booking-com15.p.rapidapi.com".to_string(),
            api_key: None,
        }
    }
}

/// Provider registry settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersSettings {
    /// Providers to register, in tie-break order.
    pub enabled: Vec<String>,
    /// Upper bound for any single upstream HTTP request.
    pub http_timeout_ms: u64,
    /// Amadeus settings.
    pub amadeus: AmadeusSettings,
    /// Duffel settings.
    pub duffel: DuffelSettings,
    /// RapidAPI Booking settings.
    pub rapid_booking: RapidBookingSettings,
}

impl Default for ProvidersSettings {
    fn default() -> Self {
        Self {
            enabled: vec![
                "amadeus".to_string(),
                "duffel".to_string(),
                "rapid-booking".to_string(),
            ],
            http_timeout_ms: 15_000,
            amadeus: AmadeusSettings::default(),
            duffel: DuffelSettings::default(),
            rapid_booking: RapidBookingSettings::default(),
        }
    }
}

impl ProvidersSettings {
    /// Returns the HTTP timeout.
    #[inline]
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable compact lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` overrides it.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server.
    pub server: ServerSettings,
    /// Aggregation.
    pub search: SearchSettings,
    /// Authentication.
    pub auth: AuthSettings,
    /// Upstream providers.
    pub providers: ProvidersSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from `.env`, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is malformed and
    /// `ConfigError::Invalid` if validation fails.
    pub fn load() -> ConfigResult<Self> {
        Self::from_builder(Self::builder())
    }

    /// Builder with every standard source registered, lowest priority first.
    ///
    /// Callers may layer defaults or overrides on top before
    /// [`from_builder`](Self::from_builder).
    #[must_use]
    pub fn builder() -> ConfigBuilder<DefaultState> {
        // A missing .env is the normal case outside development.
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder();
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => {
                builder = builder.add_source(File::from(PathBuf::from(path)).required(true));
            }
            None => {
                for dir in [".", "./config", "/etc/flights"] {
                    builder = builder
                        .add_source(File::with_name(&format!("{dir}/config")).required(false));
                }
            }
        }
        builder.add_source(Self::environment())
    }

    /// Environment source with the service's prefix and separators.
    #[must_use]
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("providers.enabled")
            .try_parsing(true)
    }

    /// Builds and validates configuration from an assembled builder.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> ConfigResult<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first violation.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::invalid("auth.jwt_secret must be set"));
        }
        for (key, value) in [
            ("search.timeout_ms", self.search.timeout_ms),
            ("search.cache_ttl_ms", self.search.cache_ttl_ms),
            ("search.stream_interval_ms", self.search.stream_interval_ms),
            ("providers.http_timeout_ms", self.providers.http_timeout_ms),
            ("auth.token_ttl_secs", self.auth.token_ttl_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::invalid(format!("{key} must be positive")));
            }
        }
        if self.providers.enabled.is_empty() {
            return Err(ConfigError::invalid(
                "providers.enabled must name at least one provider",
            ));
        }
        if let Some(unknown) = self
            .providers
            .enabled
            .iter()
            .find(|name| !KNOWN_PROVIDERS.contains(&name.as_str()))
        {
            return Err(ConfigError::invalid(format!(
                "unknown provider {unknown:?} in providers.enabled (known: {})",
                KNOWN_PROVIDERS.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::environment().source(Some(map))
    }

    fn load(toml: &str, vars: &[(&str, &str)]) -> ConfigResult<AppConfig> {
        let builder = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(env(vars));
        AppConfig::from_builder(builder)
    }

    #[test]
    fn defaults_with_secret() {
        let config = load("[auth]\njwt_secret = \"s3cret\"", &[]).unwrap();
        assert_eq!(config.server.bind_addr.port(), 8080);
        assert_eq!(config.search.timeout(), Duration::from_secs(10));
        assert_eq!(config.search.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.search.stream_interval(), Duration::from_secs(30));
        assert_eq!(config.auth.username, "demo");
        assert_eq!(
            config.providers.enabled,
            vec!["amadeus", "duffel", "rapid-booking"]
        );
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = load("", &[]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("jwt_secret"));
    }

    #[test]
    fn environment_overrides_file() {
        let config = load(
            "[auth]\njwt_secret = \"from-file\"\n[search]\ntimeout_ms = 2000",
            &[
                ("FLIGHTS__SEARCH__TIMEOUT_MS", "5000"),
                ("FLIGHTS__PROVIDERS__ENABLED", "mock,duffel"),
                ("FLIGHTS__LOGGING__FORMAT", "json"),
            ],
        )
        .unwrap();
        assert_eq!(config.search.timeout_ms, 5000);
        assert_eq!(config.providers.enabled, vec!["mock", "duffel"]);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = load(
            "[auth]\njwt_secret = \"x\"\n[providers]\nenabled = [\"skyscanner\"]",
            &[],
        )
        .unwrap_err();
        assert!(err.to_string().contains("skyscanner"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = load("[auth]\njwt_secret = \"x\"\n[search]\ntimeout_ms = 0", &[]).unwrap_err();
        assert!(err.to_string().contains("search.timeout_ms"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = load("[auth]\njwt_secret = \"hunter2\"", &[]).unwrap();
        let debug = format!("{:?}", config.auth);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("demo123"));
    }
}
