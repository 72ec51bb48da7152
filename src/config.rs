//! Gateway configuration loaded from environment variables.
//!
//! All settings come from the environment (or a `.env` file via
//! `dotenvy`) and are read once at start-up. A missing CRM webhook is
//! not a start-up error: it surfaces when a lead is submitted.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum::http::HeaderValue;
use tower_http::cors::{self, AllowHeaders, AllowMethods, CorsLayer};

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Raw value found.
        value: String,
    },
}

/// Cross-origin policy for browser clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Any origin (`*`). Credentials are not allowed with a wildcard.
    Any,
    /// Explicit list of origins.
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parses `*` or a comma-separated origin list.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Self::Any;
        }
        Self::List(
            raw.split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect(),
        )
    }

    /// Builds the CORS layer for this policy.
    ///
    /// Origins that are not valid header values are skipped with a warning.
    #[must_use]
    pub fn cors_layer(&self) -> CorsLayer {
        match self {
            Self::Any => CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods(cors::Any)
                .allow_headers(cors::Any),
            Self::List(origins) => {
                let origins: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|o| match HeaderValue::from_str(o) {
                        Ok(v) => Some(v),
                        Err(_) => {
                            tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                            None
                        }
                    })
                    .collect();
                CorsLayer::new()
                    .allow_origin(origins)
                    .allow_methods(AllowMethods::mirror_request())
                    .allow_headers(AllowHeaders::mirror_request())
                    .allow_credentials(true)
            }
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`] and shared
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// CRM webhook base URL. Contains the access secret.
    pub crm_webhook: Option<String>,

    /// Timeout applied to every CRM call.
    pub crm_timeout: Duration,

    /// Deal pipeline category.
    pub category_id: String,

    /// Stage assigned to new deals.
    pub stage_id: String,

    /// `SOURCE_ID` set on newly created contacts.
    pub contact_source_id: String,

    /// Browser origins allowed to submit leads.
    pub allowed_origins: AllowedOrigins,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            crm_webhook: None,
            crm_timeout: Duration::from_secs(DEFAULT_CRM_TIMEOUT_SECS),
            category_id: "0".to_string(),
            stage_id: "NEW".to_string(),
            contact_source_id: "WEB".to_string(),
            allowed_origins: AllowedOrigins::Any,
            log_format: LogFormat::Text,
        }
    }
}

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CRM_TIMEOUT_SECS: u64 = 20;

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file,
    /// then falls back to defaults for anything not set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LISTEN_ADDR` or `PORT` is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed listen settings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => raw.trim().parse::<SocketAddr>().map_err(|_| ConfigError::InvalidValue {
                key: "LISTEN_ADDR",
                value: raw.clone(),
            })?,
            None => {
                let port = match lookup("PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                        key: "PORT",
                        value: raw.clone(),
                    })?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::new(defaults.listen_addr.ip(), port)
            }
        };

        let crm_webhook = lookup("BITRIX_WEBHOOK")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let crm_timeout = Duration::from_secs(parse_var(
            &lookup,
            "CRM_TIMEOUT_SECS",
            DEFAULT_CRM_TIMEOUT_SECS,
        ));

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            crm_webhook,
            crm_timeout,
            category_id: lookup("CATEGORY_ID").unwrap_or(defaults.category_id),
            stage_id: lookup("STAGE_ID").unwrap_or(defaults.stage_id),
            contact_source_id: lookup("CONTACT_SOURCE_ID").unwrap_or(defaults.contact_source_id),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map_or(AllowedOrigins::Any, |raw| AllowedOrigins::parse(&raw)),
            log_format,
        })
    }
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
