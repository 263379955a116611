use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;

use crate::events::{AdmissionPolicy, DEFAULT_ACCOUNT_PREFIX};
use crate::treasury::{CommunityPoolSpender, DISTRIBUTION_MODULE};

/// Main configuration for attestation tooling
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub admission: AdmissionConfig,
    pub treasury: TreasuryConfig,
    pub logging: LoggingConfig,
}

/// Admission rules applied on top of the structural event checks
#[derive(Debug, Clone, Deserialize)]
pub struct AdmissionConfig {
    /// Required bech32 prefix for native receivers
    #[serde(default = "default_account_prefix")]
    pub account_prefix: String,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            account_prefix: default_account_prefix(),
        }
    }
}

impl AdmissionConfig {
    pub fn policy(&self) -> AdmissionPolicy {
        AdmissionPolicy {
            account_prefix: self.account_prefix.clone(),
        }
    }
}

/// Treasury configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TreasuryConfig {
    /// Module whose derived account sends community-pool spends
    #[serde(default = "default_treasury_module")]
    pub module_name: String,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            module_name: default_treasury_module(),
        }
    }
}

impl TreasuryConfig {
    pub fn spender(&self) -> CommunityPoolSpender {
        CommunityPoolSpender::new(self.module_name.clone())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(eyre!("unknown log format '{}', expected text or json", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Default functions
fn default_account_prefix() -> String {
    DEFAULT_ACCOUNT_PREFIX.to_string()
}

fn default_treasury_module() -> String {
    DISTRIBUTION_MODULE.to_string()
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path.display()))?;
        }
        Self::load_from_env()
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let admission = AdmissionConfig {
            account_prefix: env::var("ATTEST_ACCOUNT_PREFIX")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(default_account_prefix),
        };

        let treasury = TreasuryConfig {
            module_name: env::var("ATTEST_TREASURY_MODULE")
                .unwrap_or_else(|_| default_treasury_module()),
        };

        let logging = LoggingConfig {
            format: match env::var("ATTEST_LOG_FORMAT") {
                Ok(v) => v.parse().wrap_err("ATTEST_LOG_FORMAT is invalid")?,
                Err(_) => LogFormat::default(),
            },
        };

        let config = Config {
            admission,
            treasury,
            logging,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // bech32 human-readable parts are lowercase ASCII letters/digits
        let prefix = &self.admission.account_prefix;
        let valid = prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
        if !valid || prefix.is_empty() || prefix.len() > 83 {
            return Err(eyre!(
                "admission.account_prefix '{}' is not a valid bech32 prefix",
                prefix
            ));
        }

        if self.treasury.module_name.trim().is_empty() {
            return Err(eyre!("treasury.module_name cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_treasury_module() {
        assert_eq!(default_treasury_module(), "distribution");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.admission.policy(), AdmissionPolicy::default());
        assert_eq!(config.admission.account_prefix, "terra");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_account_prefix_validation() {
        let mut config = Config::default();

        config.admission.account_prefix = "cosmos".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.admission.policy().account_prefix, "cosmos");

        config.admission.account_prefix = "Terra".to_string();
        assert!(config.validate().is_err());

        config.admission.account_prefix = "ter ra".to_string();
        assert!(config.validate().is_err());

        config.admission.account_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_module_name_validation() {
        let mut config = Config::default();
        config.treasury.module_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" TEXT ".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("yaml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_spender_uses_module() {
        let treasury = TreasuryConfig {
            module_name: "gov".to_string(),
        };
        assert_eq!(treasury.spender().module_name(), "gov");
    }
}
