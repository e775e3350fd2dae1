//! Extension configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CONCIERGE_PROFILE_TABLE` - Profile store table (default: customers)
//! - `CONCIERGE_INTEGRATION_ECOMMERCE` - `Commerce7`, `Shopify` or `false` (default: false)
//! - `CONCIERGE_INTEGRATION_BOOKINGS` - `OpenTable`, `NowBookIt`, `SevenRooms` or `false` (default: false)
//! - `CONCIERGE_INTEGRATION_CRM` - `true` or `false` (default: false)
//! - `CONCIERGE_SETTLE_DELAY_MS` - Delay before the startup loading banner clears (default: 500)
//! - `CONCIERGE_SEARCH_DEBOUNCE_MS` - Search debounce window (default: 500)
//! - `CONCIERGE_TOGGLE_ACK_TIMEOUT_MS` - Longest wait for a discount toggle's answer (default: 2000)
//!
//! ## Optional (form submission sink)
//! - `CONCIERGE_FORM_SINK_URL` - Base URL of the form endpoint
//! - `CONCIERGE_FORM_SINK_API_KEY` - API key sent with each submission

use std::time::Duration;

use concierge_core::{BookingPlatform, EcommercePlatform};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_PROFILE_TABLE: &str = "customers";
const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;
const DEFAULT_TOGGLE_ACK_TIMEOUT_MS: u64 = 2_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Extension configuration.
#[derive(Debug, Clone)]
pub struct ExtensionConfig {
    /// Profile store table queried by email
    pub profile_table: String,
    /// Which optional mapper units run
    pub integrations: IntegrationConfig,
    /// Delay before Startup clears the loading flag
    pub settle_delay: Duration,
    /// Quiet period before a search query is sent
    pub search_debounce: Duration,
    /// Longest wait for a discount toggle's answer before it counts as applied
    pub toggle_ack_timeout: Duration,
    /// HTTP form sink (optional - submissions are only logged without it)
    pub form_sink: Option<FormSinkConfig>,
}

/// Enabled integrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrationConfig {
    pub ecommerce: Option<EcommercePlatform>,
    pub bookings: Option<BookingPlatform>,
    pub crm: bool,
}

/// Form submission endpoint.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FormSinkConfig {
    pub url: Url,
    pub api_key: SecretString,
}

impl std::fmt::Debug for FormSinkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSinkConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            profile_table: DEFAULT_PROFILE_TABLE.to_string(),
            integrations: IntegrationConfig::default(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            toggle_ack_timeout: Duration::from_millis(DEFAULT_TOGGLE_ACK_TIMEOUT_MS),
            form_sink: None,
        }
    }
}

impl ExtensionConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_source<F>(source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&source);

        let profile_table = env.or_default("CONCIERGE_PROFILE_TABLE", DEFAULT_PROFILE_TABLE);
        let integrations = IntegrationConfig::from_env(&env)?;
        let settle_delay = env.millis("CONCIERGE_SETTLE_DELAY_MS", DEFAULT_SETTLE_DELAY_MS)?;
        let search_debounce =
            env.millis("CONCIERGE_SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE_MS)?;
        let toggle_ack_timeout =
            env.millis("CONCIERGE_TOGGLE_ACK_TIMEOUT_MS", DEFAULT_TOGGLE_ACK_TIMEOUT_MS)?;
        let form_sink = FormSinkConfig::from_env(&env)?;

        Ok(Self {
            profile_table,
            integrations,
            settle_delay,
            search_debounce,
            toggle_ack_timeout,
            form_sink,
        })
    }
}

impl IntegrationConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<'_, F>) -> Result<Self, ConfigError> {
        let ecommerce = env
            .switch("CONCIERGE_INTEGRATION_ECOMMERCE")
            .map(|value| value.parse::<EcommercePlatform>())
            .transpose()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "CONCIERGE_INTEGRATION_ECOMMERCE".to_string(),
                    e.to_string(),
                )
            })?;
        let bookings = env
            .switch("CONCIERGE_INTEGRATION_BOOKINGS")
            .map(|value| value.parse::<BookingPlatform>())
            .transpose()
            .map_err(|e| {
                ConfigError::InvalidEnvVar(
                    "CONCIERGE_INTEGRATION_BOOKINGS".to_string(),
                    e.to_string(),
                )
            })?;
        let crm = match env.switch("CONCIERGE_INTEGRATION_CRM") {
            None => false,
            Some(value) if value.eq_ignore_ascii_case("true") => true,
            Some(value) => {
                return Err(ConfigError::InvalidEnvVar(
                    "CONCIERGE_INTEGRATION_CRM".to_string(),
                    format!("expected true or false, got {value}"),
                ));
            }
        };

        Ok(Self {
            ecommerce,
            bookings,
            crm,
        })
    }
}

impl FormSinkConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(
        env: &Env<'_, F>,
    ) -> Result<Option<Self>, ConfigError> {
        match (
            env.optional("CONCIERGE_FORM_SINK_URL"),
            env.optional("CONCIERGE_FORM_SINK_API_KEY"),
        ) {
            (Some(url), Some(key)) => {
                let url = Url::parse(&url).map_err(|e| {
                    ConfigError::InvalidEnvVar("CONCIERGE_FORM_SINK_URL".to_string(), e.to_string())
                })?;
                Ok(Some(Self {
                    url,
                    api_key: SecretString::from(key),
                }))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "CONCIERGE_FORM_SINK_API_KEY".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar(
                "CONCIERGE_FORM_SINK_URL".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// An integration switch: unset or `false` disables it.
    fn switch(&self, key: &str) -> Option<String> {
        self.optional(key)
            .filter(|value| !value.eq_ignore_ascii_case("false"))
    }

    fn millis(&self, key: &str, default: u64) -> Result<Duration, ConfigError> {
        self.optional(key)
            .map_or(Ok(default), |value| value.parse::<u64>())
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}
