//! Configuration types for momentum-alpha

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML for this schema
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is present but unusable
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub mode: OperatingMode,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Operating mode: gates whether the execution engine is invoked at all
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Classify and analyze only
    #[default]
    Development,
    /// Simulated ledger
    Paper,
    /// Real broker
    Live,
}

impl std::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatingMode::Development => write!(f, "development"),
            OperatingMode::Paper => write!(f, "paper"),
            OperatingMode::Live => write!(f, "live"),
        }
    }
}

/// Announcement feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Announcements page URL
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Seconds between polling iterations
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Attempts per fetch (including the first one)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff base in seconds; wait = factor * 2^attempt
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Evict dedup hashes first seen more than this many days ago
    #[serde(default)]
    pub dedup_retention_days: Option<u32>,
}

fn default_feed_url() -> String {
    "https://www.bseindia.com/corporates/ann.html".to_string()
}
fn default_poll_interval() -> u64 {
    15
}
fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    "MomentumAlpha/1.0".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_factor() -> f64 {
    1.0
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            poll_interval_secs: 15,
            timeout_secs: 30,
            user_agent: default_user_agent(),
            max_retries: 3,
            backoff_factor: 1.0,
            dedup_retention_days: None,
        }
    }
}

/// Signal extraction configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_primary_keywords")]
    pub primary_keywords: Vec<String>,
    #[serde(default = "default_secondary_keywords")]
    pub secondary_keywords: Vec<String>,
    /// Minimum order value in rupees (1 crore)
    #[serde(default = "default_min_order_value")]
    pub min_order_value: Decimal,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: Decimal,
    /// Wrap the keyword classifier with entity/pattern enrichment
    #[serde(default = "default_true")]
    pub enrichment: bool,
}

fn default_primary_keywords() -> Vec<String> {
    ["Award of Order", "Receives Order", "Secures Contract", "Order received"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_secondary_keywords() -> Vec<String> {
    ["Contract", "Agreement", "Supply", "Purchase Order"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_min_order_value() -> Decimal {
    Decimal::new(10_000_000, 0)
}
fn default_confidence_threshold() -> Decimal {
    Decimal::new(8, 1) // 0.8
}
fn default_true() -> bool {
    true
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            primary_keywords: default_primary_keywords(),
            secondary_keywords: default_secondary_keywords(),
            min_order_value: default_min_order_value(),
            confidence_threshold: default_confidence_threshold(),
            enrichment: true,
        }
    }
}

/// Strategy analysis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// History window for per-symbol performance
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Below this many closed trades the default parameters are used
    #[serde(default = "default_min_data_points")]
    pub min_historical_data_points: usize,
    #[serde(default = "default_max_holding_period")]
    pub max_holding_period_days: u32,
    /// Placeholder price returned by the fixed price oracle
    #[serde(default = "default_entry_price")]
    pub default_entry_price: Decimal,
}

fn default_lookback_days() -> u32 {
    30
}
fn default_min_data_points() -> usize {
    10
}
fn default_max_holding_period() -> u32 {
    5
}
fn default_entry_price() -> Decimal {
    Decimal::new(100, 0)
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            min_historical_data_points: 10,
            max_holding_period_days: 5,
            default_entry_price: default_entry_price(),
        }
    }
}

/// Risk management configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RiskConfig {
    /// Maximum value of a single position in rupees
    #[serde(default = "default_max_position_size")]
    pub max_position_size: Decimal,
    #[serde(default = "default_max_daily_trades")]
    pub max_daily_trades: u32,
    /// Fraction of max position value risked per trade
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: Decimal,
    /// Daily loss limit as a fraction of max position size
    #[serde(default = "default_circuit_breaker")]
    pub circuit_breaker_threshold: Decimal,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: Decimal,
    /// First trading hour (exchange local, inclusive)
    #[serde(default = "default_start_hour")]
    pub trading_start_hour: u32,
    /// Last trading hour (exchange local, inclusive)
    #[serde(default = "default_end_hour")]
    pub trading_end_hour: u32,
    /// Exchange offset from UTC in minutes (IST = 330)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

fn default_max_position_size() -> Decimal {
    Decimal::new(50_000, 0)
}
fn default_max_daily_trades() -> u32 {
    5
}
fn default_risk_per_trade() -> Decimal {
    Decimal::new(2, 2) // 0.02
}
fn default_circuit_breaker() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_min_confidence() -> Decimal {
    Decimal::new(7, 1) // 0.7
}
fn default_start_hour() -> u32 {
    9
}
fn default_end_hour() -> u32 {
    15
}
fn default_utc_offset() -> i32 {
    330
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_size: default_max_position_size(),
            max_daily_trades: 5,
            risk_per_trade: default_risk_per_trade(),
            circuit_breaker_threshold: default_circuit_breaker(),
            min_confidence: default_min_confidence(),
            trading_start_hour: 9,
            trading_end_hour: 15,
            utc_offset_minutes: 330,
        }
    }
}

/// Broker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    /// Broker implementation name ("zerodha" or "fyers")
    #[serde(default = "default_broker_name")]
    pub name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Override the broker REST base URL
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_broker_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub paper: PaperConfig,
}

fn default_broker_name() -> String {
    "zerodha".to_string()
}
fn default_broker_timeout() -> u64 {
    10
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            name: default_broker_name(),
            api_key: None,
            api_secret: None,
            access_token: None,
            base_url: None,
            timeout_secs: 10,
            paper: PaperConfig::default(),
        }
    }
}

/// Paper trading ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaperConfig {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,
}

fn default_initial_balance() -> Decimal {
    Decimal::new(100_000, 0)
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults with environment overrides, for runs without a file
    pub fn from_env_defaults() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override secrets and log level from the environment
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BROKER_API_KEY") {
            self.broker.api_key = Some(v);
        }
        if let Some(v) = lookup("BROKER_API_SECRET") {
            self.broker.api_secret = Some(v);
        }
        if let Some(v) = lookup("BROKER_ACCESS_TOKEN") {
            self.broker.access_token = Some(v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.telemetry.log_level = v;
        }
    }

    /// Reject values that would make the pipeline misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.max_retries == 0 {
            return Err(ConfigError::Invalid {
                key: "feed.max_retries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.feed.backoff_factor < 0.0 || !self.feed.backoff_factor.is_finite() {
            return Err(ConfigError::Invalid {
                key: "feed.backoff_factor",
                reason: format!("{} is not a non-negative number", self.feed.backoff_factor),
            });
        }
        if self.risk.trading_start_hour > self.risk.trading_end_hour
            || self.risk.trading_end_hour > 23
        {
            return Err(ConfigError::Invalid {
                key: "risk.trading_end_hour",
                reason: format!(
                    "trading hours {}..={} are not a valid range",
                    self.risk.trading_start_hour, self.risk.trading_end_hour
                ),
            });
        }
        for (key, value) in [
            ("risk.max_position_size", self.risk.max_position_size),
            ("risk.risk_per_trade", self.risk.risk_per_trade),
            ("risk.circuit_breaker_threshold", self.risk.circuit_breaker_threshold),
        ] {
            if value <= Decimal::ZERO {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("{value} must be positive"),
                });
            }
        }
        if self.risk.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid {
                key: "risk.utc_offset_minutes",
                reason: format!("{} is out of range", self.risk.utc_offset_minutes),
            });
        }
        Ok(())
    }

    /// Render the effective configuration with credentials masked
    pub fn masked(&self) -> Config {
        let mut masked = self.clone();
        let mask = |v: &Option<String>| v.as_ref().map(|s| "*".repeat(s.chars().count()));
        masked.broker.api_key = mask(&self.broker.api_key);
        masked.broker.api_secret = mask(&self.broker.api_secret);
        masked.broker.access_token = mask(&self.broker.access_token);
        masked
    }
}
