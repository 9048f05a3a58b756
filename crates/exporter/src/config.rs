//! Exporter configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (`shpat_...`, HIGH PRIVILEGE)
//!
//! ## Optional
//! - `EXPORTER_HOST` - Bind address (default: 127.0.0.1)
//! - `EXPORTER_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2024-01)
//! - `SHOPIFY_API_MODE` - `graphql` or `rest` (default: graphql)
//! - `SHOPIFY_API_BASE_URL` - API origin override (default: `https://{SHOPIFY_STORE}`)
//! - `EXPORT_INCLUDE_PRICING` - Add currency/price columns (default: false)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;
use zedonk_core::ExportLayout;

const DEFAULT_API_VERSION: &str = "2024-01";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const ADMIN_TOKEN_PREFIX: &str = "shpat_";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which Admin API the exporter reads orders from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiMode {
    /// `POST /admin/api/{version}/graphql.json`
    #[default]
    GraphQl,
    /// `GET /admin/api/{version}/orders/{id}.json` plus product lookups.
    Rest,
}

impl fmt::Display for ApiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GraphQl => write!(f, "graphql"),
            Self::Rest => write!(f, "rest"),
        }
    }
}

impl FromStr for ApiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graphql" => Ok(Self::GraphQl),
            "rest" => Ok(Self::Rest),
            other => Err(format!("invalid API mode: {other} (expected graphql or rest)")),
        }
    }
}

/// Exporter application configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify Admin API configuration
    pub shopify: ShopifyConfig,
    /// Column layout for generated CSV files
    pub layout: ExportLayout,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2024-01)
    pub api_version: String,
    /// Admin API access token
    pub access_token: SecretString,
    /// GraphQL or REST
    pub api_mode: ApiMode,
    /// Origin the Admin API paths are joined onto. Always ends with `/`.
    pub base_url: Url,
}

impl fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("api_mode", &self.api_mode)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl ShopifyConfig {
    /// Configuration for `store` with default version, GraphQL mode and the
    /// store's own origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the store domain does not form
    /// a valid URL.
    pub fn new(store: impl Into<String>, access_token: SecretString) -> Result<Self, ConfigError> {
        let store = store.into();
        let base_url = parse_base_url(&format!("https://{store}"), "SHOPIFY_STORE")?;
        Ok(Self {
            store,
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token,
            api_mode: ApiMode::default(),
            base_url,
        })
    }

    /// Point the client at a different origin (a proxy or a mock server).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not a valid URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url, "SHOPIFY_API_BASE_URL")?;
        Ok(self)
    }

    /// Select the Admin API flavour.
    #[must_use]
    pub fn with_api_mode(mut self, api_mode: ApiMode) -> Self {
        self.api_mode = api_mode;
        self
    }

    /// Problems with the access token that should be logged at startup.
    ///
    /// Custom-app tokens can differ from the usual format, so these never
    /// fail loading.
    #[must_use]
    pub fn token_warnings(&self) -> Vec<String> {
        token_warnings(self.access_token.expose_secret())
    }

    fn from_env() -> Result<Self, ConfigError> {
        let store = get_required_env("SHOPIFY_STORE")?;
        let access_token = get_required_env("SHOPIFY_ACCESS_TOKEN")?;

        let api_mode = get_env_or_default("SHOPIFY_API_MODE", "graphql")
            .parse::<ApiMode>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_API_MODE".to_string(), e))?;

        let mut config = Self::new(store, SecretString::from(access_token))?.with_api_mode(api_mode);
        config.api_version = get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);
        if let Some(base_url) = get_optional_env("SHOPIFY_API_BASE_URL") {
            config = config.with_base_url(&base_url)?;
        }
        Ok(config)
    }
}

impl ExporterConfig {
    /// Configuration with default bind address, basic layout and no Sentry.
    #[must_use]
    pub fn new(shopify: ShopifyConfig) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            shopify,
            layout: ExportLayout::Basic,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("EXPORTER_HOST", DEFAULT_HOST)
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("EXPORTER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("EXPORTER_PORT", DEFAULT_PORT)
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("EXPORTER_PORT".to_string(), e.to_string()))?;

        let shopify = ShopifyConfig::from_env()?;

        let include_pricing = get_optional_env("EXPORT_INCLUDE_PRICING")
            .map(|v| parse_bool(&v, "EXPORT_INCLUDE_PRICING"))
            .transpose()?
            .unwrap_or(false);
        let layout = if include_pricing {
            ExportLayout::WithPricing
        } else {
            ExportLayout::Basic
        };

        let log_json = get_optional_env("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .map(|v| parse_sample_rate(&v, "SENTRY_SAMPLE_RATE"))
            .transpose()?
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .map(|v| parse_sample_rate(&v, "SENTRY_TRACES_SAMPLE_RATE"))
            .transpose()?
            .unwrap_or(0.0);

        Ok(Self {
            host,
            port,
            shopify,
            layout,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str, var_name: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn parse_sample_rate(value: &str, var_name: &str) -> Result<f32, ConfigError> {
    let rate = value
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

fn parse_base_url(raw: &str, var_name: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Warnings for an access token that looks wrong.
fn token_warnings(token: &str) -> Vec<String> {
    let mut warnings = Vec::new();
    if !token.starts_with(ADMIN_TOKEN_PREFIX) {
        warnings.push(format!(
            "SHOPIFY_ACCESS_TOKEN does not start with {ADMIN_TOKEN_PREFIX}"
        ));
    }
    if let Err(e) = validate_secret_strength(token, "SHOPIFY_ACCESS_TOKEN") {
        warnings.push(format!("SHOPIFY_ACCESS_TOKEN validation warning: {e}"));
    }
    warnings
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn shopify() -> ShopifyConfig {
        ShopifyConfig::new(
            "test-store.myshopify.com",
            SecretString::from("shpat_0f9e8d7c6b5a49382716aBcDeF"),
        )
        .unwrap()
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("shpat_your-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("shpat_0f9e8d7c6b5a49382716aBcDeF", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_token_warnings_clean_token() {
        assert!(shopify().token_warnings().is_empty());
    }

    #[test]
    fn test_token_warnings_prefix_and_placeholder() {
        let config = ShopifyConfig::new(
            "test-store.myshopify.com",
            SecretString::from("your-token-here"),
        )
        .unwrap();
        let warnings = config.token_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("does not start with shpat_"));
        assert!(warnings[1].contains("placeholder"));
    }

    #[test]
    fn test_parse_sample_rate() {
        assert!((parse_sample_rate(" 0.25 ", "X").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(matches!(
            parse_sample_rate("often", "SENTRY_SAMPLE_RATE"),
            Err(ConfigError::InvalidEnvVar(var, _)) if var == "SENTRY_SAMPLE_RATE"
        ));
        assert!(matches!(
            parse_sample_rate("1.5", "X"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_api_mode_parse() {
        assert_eq!("GraphQL".parse::<ApiMode>(), Ok(ApiMode::GraphQl));
        assert_eq!(" rest ".parse::<ApiMode>(), Ok(ApiMode::Rest));
        assert!("soap".parse::<ApiMode>().is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE", "X").unwrap());
        assert!(!parse_bool("0", "X").unwrap());
        assert!(matches!(
            parse_bool("maybe", "X"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_default_base_url_is_store_origin() {
        let config = shopify();
        assert_eq!(
            config.base_url.as_str(),
            "https://test-store.myshopify.com/"
        );
        assert_eq!(config.api_version, "2024-01");
        assert_eq!(config.api_mode, ApiMode::GraphQl);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = shopify().with_base_url("http://127.0.0.1:9000/proxy").unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:9000/proxy/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            shopify().with_base_url("not a url"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_socket_addr() {
        let config = ExporterConfig::new(shopify());
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert_eq!(config.layout, ExportLayout::Basic);
    }

    #[test]
    fn test_shopify_config_debug_redacts_token() {
        let debug_output = format!("{:?}", shopify());

        assert!(debug_output.contains("test-store.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_0f9e8d7c6b5a49382716aBcDeF"));
    }
}
