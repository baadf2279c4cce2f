use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env as std_env;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_LOCAL_STATE: &str = "gujarat";
const DEFAULT_LOCAL_CHARGE: u32 = 60;
const DEFAULT_STANDARD_CHARGE: u32 = 100;
const DEFAULT_MINIMUM_PACKETS: u32 = 10;
const CONFIG_DIR: &str = "config";

/// Delivery-charge configuration.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// State matched case-insensitively for the local rate.
    #[serde(default = "default_local_state")]
    pub local_state: String,

    /// Charge for deliveries within the local state.
    #[serde(default = "default_local_charge")]
    pub local_charge: u32,

    /// Charge for deliveries everywhere else.
    #[serde(default = "default_standard_charge")]
    pub standard_charge: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            local_state: default_local_state(),
            local_charge: default_local_charge(),
            standard_charge: default_standard_charge(),
        }
    }
}

/// Hamper defaults applied when a product's config omits them.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HamperDefaults {
    /// Minimum total packet count across flavors.
    #[validate(range(min = 1))]
    #[serde(default = "default_minimum_packets")]
    pub minimum_packets: u32,
}

impl Default for HamperDefaults {
    fn default() -> Self {
        Self {
            minimum_packets: default_minimum_packets(),
        }
    }
}

/// Storefront configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct StorefrontConfig {
    /// Base URL of the REST backend.
    #[validate(url)]
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Timeout for backend requests (1s - 5min).
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Display currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Delivery-charge table
    #[serde(default)]
    #[validate]
    pub delivery: DeliveryConfig,

    /// Hamper defaults
    #[serde(default)]
    #[validate]
    pub hamper: HamperDefaults,

    /// Tax rate applied to subtotals. Currently zero everywhere; kept
    /// configurable rather than hardcoded.
    #[serde(default)]
    pub tax_rate: f64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout_secs(),
            currency: default_currency(),
            log_level: default_log_level(),
            log_json: false,
            delivery: DeliveryConfig::default(),
            hamper: HamperDefaults::default(),
            tax_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_local_state() -> String {
    DEFAULT_LOCAL_STATE.to_string()
}

fn default_local_charge() -> u32 {
    DEFAULT_LOCAL_CHARGE
}

fn default_standard_charge() -> u32 {
    DEFAULT_STANDARD_CHARGE
}

fn default_minimum_packets() -> u32 {
    DEFAULT_MINIMUM_PACKETS
}

/// Loads configuration from `config/default.toml` (optional), an optional
/// environment-specific file selected by `STOREFRONT_ENV`, and
/// `STOREFRONT__*` environment variables, then validates the result.
pub fn load_config() -> Result<StorefrontConfig, ConfigError> {
    let run_env = std_env::var("STOREFRONT_ENV").unwrap_or_else(|_| "development".to_string());

    let settings = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("STOREFRONT").separator("__"))
        .build()?;

    let config: StorefrontConfig = settings.try_deserialize()?;

    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    Ok(config)
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// configured level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("storefront_core={}", level);
    let filter_directive = std_env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if json {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init();
    }
}
