//! Engine configuration.
//!
//! One immutable [`EngineConfig`] value is passed into every top-level engine
//! call. It can be loaded from:
//! - TOML files (default: ~/.config/mediakey/config.toml)
//! - Environment variables (MEDIAKEY_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use mediakey_core::config::EngineConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = EngineConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = EngineConfig::from_file(std::path::Path::new("mediakey.toml")).expect("Failed to load");
//! ```
//!
//! # File format
//!
//! ```toml
//! [mediakey]
//! collection_root = "/srv/media/collections"
//! holding_root = "/srv/media/holding"
//! naming_template = "{userId}_{timestamp}_{index}{ext}"
//! max_output = 5
//! missing_target = "fallback"
//!
//! [[mediakey.quota.users]]
//! id = "10001"
//! size_limit_mb = 20
//!
//! [[mediakey.quota.groups]]
//! id = "default"
//! size_limit_mb = 2
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::defaults;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid missing-target policy: {0}")]
    InvalidPolicy(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// QUOTA TABLES
// =============================================================================

/// A configured size limit as written by the operator.
///
/// Numbers and numeric strings are both accepted; anything that does not
/// describe a finite, non-negative number of megabytes counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitValue {
    Number(f64),
    Text(String),
}

impl LimitValue {
    /// Effective limit in megabytes, coerced to `>= 0`.
    pub fn megabytes(&self) -> f64 {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}

impl From<f64> for LimitValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One row of a quota table. `id = "default"` is the wildcard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaRule {
    pub id: String,
    pub size_limit_mb: LimitValue,
}

impl QuotaRule {
    pub fn new(id: impl Into<String>, size_limit_mb: impl Into<LimitValue>) -> Self {
        Self {
            id: id.into(),
            size_limit_mb: size_limit_mb.into(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == defaults::DEFAULT_RULE_ID
    }
}

/// User and group quota tables, each scanned in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaConfig {
    #[serde(default)]
    pub users: Vec<QuotaRule>,
    #[serde(default)]
    pub groups: Vec<QuotaRule>,
}

impl QuotaConfig {
    /// Parse a table from `id=mb` pairs separated by commas (`10001=20,default=2`).
    ///
    /// Malformed pairs are skipped.
    pub fn parse_table(pairs: &str) -> Vec<QuotaRule> {
        pairs.split(',')
            .filter_map(|pair| {
                let (id, limit) = pair.split_once('=')?;
                let id = id.trim();
                if id.is_empty() {
                    return None;
                }
                Some(QuotaRule {
                    id: id.to_string(),
                    size_limit_mb: LimitValue::Text(limit.trim().to_string()),
                })
            })
            .collect()
    }
}

// =============================================================================
// ENGINE CONFIG
// =============================================================================

/// What to do when a save keyword matches no collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingTargetPolicy {
    /// Write into the holding area.
    #[default]
    Fallback,
    /// Abandon the save.
    Cancel,
}

impl FromStr for MissingTargetPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fallback" => Ok(Self::Fallback),
            "cancel" => Ok(Self::Cancel),
            _ => Err(ConfigError::InvalidPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for MissingTargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fallback => write!(f, "fallback"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Main engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory whose immediate subdirectories are collections.
    pub collection_root: PathBuf,
    /// Directory for saves whose keyword matched nothing.
    pub holding_root: PathBuf,
    /// File naming template with `{placeholder}` keys.
    #[serde(default = "EngineConfig::default_naming_template")]
    pub naming_template: String,
    /// Maximum items per retrieval. Values below 1 behave as 1.
    #[serde(default = "EngineConfig::default_max_output")]
    pub max_output: i64,
    #[serde(default)]
    pub missing_target: MissingTargetPolicy,
    /// Seconds to wait for a prompted reply.
    #[serde(default = "EngineConfig::default_prompt_timeout")]
    pub prompt_timeout_secs: u64,
    /// Emit debug traces of every resolution decision.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub quota: QuotaConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collection_root: PathBuf::from(defaults::COLLECTION_ROOT),
            holding_root: PathBuf::from(defaults::HOLDING_ROOT),
            naming_template: Self::default_naming_template(),
            max_output: Self::default_max_output(),
            missing_target: MissingTargetPolicy::default(),
            prompt_timeout_secs: Self::default_prompt_timeout(),
            debug: false,
            quota: QuotaConfig::default(),
        }
    }
}

impl EngineConfig {
    fn default_naming_template() -> String {
        defaults::NAMING_TEMPLATE.to_string()
    }

    fn default_max_output() -> i64 {
        i64::from(defaults::MAX_OUTPUT)
    }

    fn default_prompt_timeout() -> u64 {
        defaults::PROMPT_TIMEOUT_SECS
    }

    /// Build a config rooted at the given directories, other fields default.
    pub fn with_roots(collection_root: impl Into<PathBuf>, holding_root: impl Into<PathBuf>) -> Self {
        Self {
            collection_root: collection_root.into(),
            holding_root: holding_root.into(),
            ..Self::default()
        }
    }

    /// Maximum output clamped into `1..=u32::MAX`.
    pub fn effective_max_output(&self) -> u32 {
        self.max_output.clamp(1, i64::from(u32::MAX)) as u32
    }

    pub fn prompt_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.prompt_timeout_secs)
    }

    /// Get the default config file path.
    ///
    /// Returns: ~/.config/mediakey/config.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("mediakey");
        path.push("config.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading mediakey config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            let config = Self::from_env();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a TOML file with a `[mediakey]` root table.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, substituting `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            mediakey: EngineConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        root.mediakey.validate()?;
        Ok(root.mediakey)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            collection_root: env::var("MEDIAKEY_COLLECTION_ROOT")
                .map(PathBuf::from)
                .unwrap_or(base.collection_root),
            holding_root: env::var("MEDIAKEY_HOLDING_ROOT")
                .map(PathBuf::from)
                .unwrap_or(base.holding_root),
            naming_template: env::var("MEDIAKEY_NAMING_TEMPLATE")
                .unwrap_or(base.naming_template),
            max_output: env::var("MEDIAKEY_MAX_OUTPUT")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(base.max_output),
            missing_target: env::var("MEDIAKEY_MISSING_TARGET")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.missing_target),
            prompt_timeout_secs: env::var("MEDIAKEY_PROMPT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(base.prompt_timeout_secs),
            debug: env::var("MEDIAKEY_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            quota: QuotaConfig {
                users: env::var("MEDIAKEY_USER_QUOTA")
                    .map(|s| QuotaConfig::parse_table(&s))
                    .unwrap_or_default(),
                groups: env::var("MEDIAKEY_GROUP_QUOTA")
                    .map(|s| QuotaConfig::parse_table(&s))
                    .unwrap_or_default(),
            },
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.collection_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "collection_root cannot be empty".to_string(),
            ));
        }

        if self.holding_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "holding_root cannot be empty".to_string(),
            ));
        }

        if self.naming_template.trim().is_empty() {
            return Err(ConfigError::Validation(
                "naming_template cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }
}
