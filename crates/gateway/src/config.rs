//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WORDPRESS_URL` - Base URL of the WordPress site hosting the catalog plugin
//!
//! ## Optional
//! - `WORDPRESS_APP_USERNAME` - WordPress application-password user
//! - `WORDPRESS_APP_PASSWORD` - WordPress application password (spaces allowed)
//! - `WORDPRESS_API_KEY` - Bearer token, used only when no app password is set
//! - `GATEWAY_API_KEY` - Required `X-API-Key` value; unset disables the check
//! - `REFRESH_INTERVAL` - Seconds between background refreshes (default: 300)
//! - `DEBUG_MODE` - Verbose logging toggle (default: false)
//! - `USE_SAMPLE_DATA` - Serve built-in sample data only, never call upstream (default: false)
//! - `ALLOW_SAMPLE_DATA_FALLBACK` - Degrade to sample data when live sources fail (default: false)
//! - `WORDPRESS_TEST_ENDPOINT` - Probe the plugin test route before catalog fetches (default: false)
//! - `ESIM_PROVIDER_API_URL` / `ESIM_PROVIDER_API_KEY` - Secondary provider; both required to enable it
//! - `ESIM_PROVIDER_CLIENT_ID` / `ESIM_PROVIDER_CLIENT_SECRET` - Extra provider credentials
//! - `LISTEN_HOST` - Bind address (default: 0.0.0.0)
//! - `LISTEN_PORT` - Listen port (default: 8080)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default seconds between background catalog refreshes.
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Gateway application configuration.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL of the WordPress site (no trailing slash).
    pub wordpress_url: String,
    /// WordPress application-password user, paired with `wordpress_app_password`.
    pub wordpress_username: Option<String>,
    /// WordPress application password. Takes precedence over the bearer key.
    pub wordpress_app_password: Option<SecretString>,
    /// Bearer token for the WordPress API, used when no app password is set.
    pub wordpress_api_key: Option<SecretString>,
    /// Required `X-API-Key` header value; `None` disables the check entirely.
    pub gateway_api_key: Option<SecretString>,
    /// Interval between background catalog refreshes.
    pub refresh_interval: Duration,
    /// Verbose logging toggle.
    pub debug_mode: bool,
    /// Serve built-in sample data only; never call any network source.
    pub use_sample_data: bool,
    /// Permit degrading to sample data when every live source fails.
    pub allow_sample_fallback: bool,
    /// Probe the plugin test route before each catalog fetch.
    pub probe_test_endpoint: bool,
    /// Secondary provider API, enabled only when URL and key are both set.
    pub provider: Option<ProviderConfig>,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("wordpress_url", &self.wordpress_url)
            .field("wordpress_username", &self.wordpress_username)
            .field("wordpress_app_password", &self.wordpress_app_password.as_ref().map(|_| "[REDACTED]"))
            .field("wordpress_api_key", &self.wordpress_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gateway_api_key", &self.gateway_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_interval", &self.refresh_interval)
            .field("debug_mode", &self.debug_mode)
            .field("use_sample_data", &self.use_sample_data)
            .field("allow_sample_fallback", &self.allow_sample_fallback)
            .field("probe_test_endpoint", &self.probe_test_endpoint)
            .field("provider", &self.provider)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sentry_dsn", &self.sentry_dsn)
            .finish()
    }
}

/// Secondary provider (OCS) API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider API base URL (no trailing slash).
    pub base_url: String,
    /// Provider API key, sent as `X-API-KEY`.
    pub api_key: SecretString,
    /// Optional client id, sent as `X-CLIENT-ID`.
    pub client_id: Option<String>,
    /// Optional client secret, sent as `X-CLIENT-SECRET`.
    pub client_secret: Option<SecretString>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `WORDPRESS_URL` is missing or malformed, or
    /// if a numeric or address variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let wordpress_url = get_base_url("WORDPRESS_URL")?;

        let refresh_secs = get_env_or_default(
            "REFRESH_INTERVAL",
            &DEFAULT_REFRESH_INTERVAL_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar("REFRESH_INTERVAL".to_string(), e.to_string()))?;

        let host = get_env_or_default("LISTEN_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LISTEN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LISTEN_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LISTEN_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            wordpress_url,
            wordpress_username: get_optional_env("WORDPRESS_APP_USERNAME"),
            wordpress_app_password: get_optional_secret("WORDPRESS_APP_PASSWORD"),
            wordpress_api_key: get_optional_secret("WORDPRESS_API_KEY"),
            gateway_api_key: get_optional_secret("GATEWAY_API_KEY"),
            refresh_interval: Duration::from_secs(refresh_secs),
            debug_mode: get_bool_env("DEBUG_MODE"),
            use_sample_data: get_bool_env("USE_SAMPLE_DATA"),
            allow_sample_fallback: get_bool_env("ALLOW_SAMPLE_DATA_FALLBACK"),
            probe_test_endpoint: get_bool_env("WORDPRESS_TEST_ENDPOINT"),
            provider: ProviderConfig::from_env()?,
            host,
            port,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ProviderConfig {
    /// Returns `None` unless both the URL and the key are configured.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let base_url = get_optional_env("ESIM_PROVIDER_API_URL");
        let api_key = get_optional_env("ESIM_PROVIDER_API_KEY");

        let (Some(base_url), Some(api_key)) = (base_url, api_key) else {
            return Ok(None);
        };

        Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("ESIM_PROVIDER_API_URL".to_string(), e.to_string())
        })?;

        Ok(Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(api_key),
            client_id: get_optional_env("ESIM_PROVIDER_CLIENT_ID"),
            client_secret: get_optional_secret("ESIM_PROVIDER_CLIENT_SECRET"),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required base URL, validated and stripped of any trailing slash.
fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(raw.trim_end_matches('/').to_string())
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an optional environment variable as a secret.
fn get_optional_secret(key: &str) -> Option<SecretString> {
    get_optional_env(key).map(SecretString::from)
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a boolean toggle; anything other than `"true"` (case-insensitive) is false.
fn get_bool_env(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| v.eq_ignore_ascii_case("true"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            wordpress_url: "https://catalog.example.com".to_string(),
            wordpress_username: None,
            wordpress_app_password: None,
            wordpress_api_key: None,
            gateway_api_key: None,
            refresh_interval: Duration::from_secs(300),
            debug_mode: false,
            use_sample_data: false,
            allow_sample_fallback: false,
            probe_test_endpoint: false,
            provider: None,
            host: "0.0.0.0".parse().unwrap(),
            port: 8080,
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = GatewayConfig {
            wordpress_username: Some("svc_user".to_string()),
            wordpress_app_password: Some(SecretString::from("TSQJ TqlX aI1y waL0")),
            gateway_api_key: Some(SecretString::from("super_secret_gateway_key")),
            provider: Some(ProviderConfig {
                base_url: "https://ocs.example.com".to_string(),
                api_key: SecretString::from("super_secret_provider_key"),
                client_id: Some("client-1".to_string()),
                client_secret: Some(SecretString::from("super_secret_client")),
            }),
            ..test_config()
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("catalog.example.com"));
        assert!(debug_output.contains("svc_user"));
        assert!(debug_output.contains("client-1"));

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("TSQJ"));
        assert!(!debug_output.contains("super_secret_gateway_key"));
        assert!(!debug_output.contains("super_secret_provider_key"));
        assert!(!debug_output.contains("super_secret_client"));
    }
}
