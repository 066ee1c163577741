//! Configuration module for the brokerage engine.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before anything is wired up.
//!
//! # Usage
//!
//! ```rust,ignore
//! use brokerage_engine::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod ledger;
mod observability;
mod seed;
mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ledger::{LedgerConfig, RetrySettings};
pub use observability::{LoggingConfig, ObservabilityConfig};
pub use seed::{SeedBalance, SeedConfig, SeedCustomer};
pub use server::ServerConfig;

use crate::domain::shared::Symbol;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Demo data seeding.
    #[serde(default)]
    pub seed: SeedConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let server = &config.server;
    if server.metrics_enabled && server.http_port == server.metrics_port {
        return Err(ConfigError::ValidationError(
            "http_port and metrics_port must be different".to_string(),
        ));
    }

    let base = config.ledger.base_currency.trim();
    if base.is_empty() || !base.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::ValidationError(format!(
            "ledger.base_currency must be a non-empty alphanumeric symbol, got '{base}'"
        )));
    }

    let retry = &config.ledger.retry;
    if retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "ledger.retry.max_attempts must be at least 1".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&retry.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "ledger.retry.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    if retry.backoff_multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "ledger.retry.backoff_multiplier must be at least 1.0".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    let format = config.observability.logging.format.to_ascii_lowercase();
    if !valid_formats.contains(&format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    for customer in &config.seed.customers {
        if customer.customer_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "seed customer_id must not be empty".to_string(),
            ));
        }
        for line in &customer.balances {
            if line.amount.is_sign_negative() {
                return Err(ConfigError::ValidationError(format!(
                    "seed balance {} for {} must not be negative",
                    line.asset_name, customer.customer_id
                )));
            }
            if Symbol::new(line.asset_name.as_str()).validate().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "seed asset name '{}' is not a valid symbol",
                    line.asset_name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.server.metrics_port, 9090);
        assert_eq!(config.ledger.base_currency, "TRY");
        assert_eq!(config.ledger.retry.max_attempts, 5);
        assert_eq!(config.observability.logging.level, "info");
        assert!(!config.seed.enabled);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_minimal_config() {
        let yaml = r"
server:
  http_port: 8081
";

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };
        assert_eq!(config.server.http_port, 8081);
        assert_eq!(config.ledger.base_currency, "TRY"); // Default value
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "base_currency: ${BROKERAGE_CONFIG_TEST_NONEXISTENT_VAR:-USD}";
        let result = interpolate_env_vars(input);

        assert_eq!(result, "base_currency: USD");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax, not format args
    fn test_env_var_with_default_uses_existing() {
        // PATH should always exist
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);

        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "level: ${BROKERAGE_CONFIG_TEST_UNLIKELY_TO_EXIST}";
        let result = interpolate_env_vars(input);

        assert_eq!(result, "level: ");
    }

    #[test]
    fn test_validation_same_ports() {
        let yaml = r"
server:
  http_port: 8080
  metrics_port: 8080
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for duplicate ports");
        };
        assert!(err.to_string().contains("must be different"));
    }

    #[test]
    fn test_same_ports_allowed_when_metrics_disabled() {
        let yaml = r"
server:
  http_port: 8080
  metrics_port: 8080
  metrics_enabled: false
";

        assert!(load_config_from_string(yaml).is_ok());
    }

    #[test]
    fn test_validation_zero_attempts() {
        let yaml = r"
ledger:
  retry:
    max_attempts: 0
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for zero attempts");
        };
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validation_jitter_out_of_range() {
        let yaml = r"
ledger:
  retry:
    jitter_factor: 1.5
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for jitter");
        };
        assert!(err.to_string().contains("jitter_factor"));
    }

    #[test]
    fn test_validation_bad_base_currency() {
        let yaml = r#"
ledger:
  base_currency: "T R Y"
"#;

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for base currency");
        };
        assert!(err.to_string().contains("base_currency"));
    }

    #[test]
    fn test_validation_negative_seed_balance() {
        let yaml = r"
seed:
  enabled: true
  customers:
    - customer_id: john
      balances:
        - asset_name: TRY
          amount: -5
";

        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for negative seed");
        };
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_full_config_parse() {
        let yaml = r#"
server:
  http_port: 8080
  metrics_port: 9191
  metrics_enabled: true
  bind_address: "127.0.0.1"

ledger:
  base_currency: "TRY"
  retry:
    max_attempts: 8
    initial_backoff_ms: 2
    max_backoff_ms: 50
    backoff_multiplier: 1.5
    jitter_factor: 0.25

observability:
  logging:
    level: "debug"
    format: "pretty"

seed:
  enabled: true
  customers:
    - customer_id: admin
      balances:
        - asset_name: TRY
          amount: 1000000
    - customer_id: john
      balances:
        - asset_name: TRY
          amount: 10000
        - asset_name: AAPL
          amount: 100
"#;

        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.metrics_port, 9191);
        assert_eq!(config.ledger.retry.max_attempts, 8);
        assert!((config.ledger.retry.jitter_factor - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.observability.logging.level, "debug");
        assert!(!config.observability.logging.is_json());
        assert_eq!(config.seed.customers.len(), 2);
        assert_eq!(config.seed.customers[1].balances[1].asset_name, "AAPL");
        assert_eq!(config.seed.customers[0].balances[0].amount, dec!(1000000));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  http_port: 8181\nledger:\n  base_currency: USD").unwrap();

        let config = load_config(file.path().to_str()).unwrap();
        assert_eq!(config.server.http_port, 8181);
        assert_eq!(config.ledger.base_currency, "USD");
    }

    #[test]
    fn test_load_config_missing_file() {
        let Err(err) = load_config(Some("/nonexistent/brokerage.yaml")) else {
            panic!("expected read error");
        };
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }
}
