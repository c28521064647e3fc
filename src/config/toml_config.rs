use crate::core::normalization::DEFAULT_REFERENCE_SECONDS_UNTIL_EXPIRATION;
use crate::utils::error::{CacheError, Result};
use crate::utils::validation::{validate_positive_number, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    #[serde(default)]
    pub normalization: ReferenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_seconds_until_expiration")]
    pub reference_seconds_until_expiration: u64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            reference_seconds_until_expiration: DEFAULT_REFERENCE_SECONDS_UNTIL_EXPIRATION,
        }
    }
}

fn default_reference_seconds_until_expiration() -> u64 {
    DEFAULT_REFERENCE_SECONDS_UNTIL_EXPIRATION
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

impl NormalizationConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置, `${VAR}` 會以環境變數替換
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| CacheError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Installs the configured log subscriber. Returns `false` if one was
    /// already installed.
    pub fn init_logging(&self) -> bool {
        if self.logging.json {
            crate::utils::logger::init_json_logger(self.logging.verbose)
        } else {
            crate::utils::logger::init_logger(self.logging.verbose)
        }
    }
}

fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}

impl Validate for NormalizationConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number(
            "normalization.reference_seconds_until_expiration",
            self.normalization.reference_seconds_until_expiration,
            1,
        )
    }
}
