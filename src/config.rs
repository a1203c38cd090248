//! Configuration system for workflow and agent settings
//!
//! Configuration is loaded from a TOML file. API keys are never stored in the
//! file itself; each section names the environment variable that holds its key
//! and resolution happens at runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub llm: LlmSection,
    /// News search configuration (optional, required for the news agent)
    pub search: Option<SearchSection>,
    /// Email delivery configuration (optional, required for the email agent)
    pub email: Option<EmailSection>,
}

/// LLM provider section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    /// Provider name (e.g., "anthropic", "openai")
    pub provider: String,
    /// Model used for cheap, high-volume calls
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    /// Model used for calls that need more capability
    #[serde(default = "default_capable_model")]
    pub capable_model: String,
    /// Environment variable containing the API key
    pub api_key_env: String,
    /// Optional temperature (0.0 to 2.0)
    pub temperature: Option<f32>,
    /// Optional max tokens
    pub max_tokens: Option<u32>,
}

fn default_fast_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_capable_model() -> String {
    "gpt-4o".to_string()
}

/// News search section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSection {
    /// Environment variable containing the search API key
    pub api_key_env: String,
    /// Number of results to request per query (default: 5)
    #[serde(default = "default_result_count")]
    pub result_count: u32,
}

fn default_result_count() -> u32 {
    5
}

/// Email delivery section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailSection {
    /// Environment variable containing the mail API key
    pub api_key_env: String,
    /// Environment variable containing the mail API secret
    pub api_secret_env: String,
    pub sender_email: String,
    pub sender_name: String,
    pub recipient_email: String,
    pub recipient_name: String,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field consistency
    fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.provider.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "llm.provider must not be empty".to_string(),
            ));
        }
        if let Some(temp) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(ConfigError::InvalidConfig(format!(
                    "llm.temperature must be between 0.0 and 2.0, got {temp}"
                )));
            }
        }
        Ok(())
    }

    /// Helper to get a required environment variable with consistent errors
    fn get_env_var_required(env_var_name: &str) -> Result<String, ConfigError> {
        std::env::var(env_var_name)
            .map_err(|_| ConfigError::MissingEnvVar(env_var_name.to_string()))
    }

    /// Get LLM API key from environment variable
    pub fn get_llm_api_key(&self) -> Result<String, ConfigError> {
        Self::get_env_var_required(&self.llm.api_key_env)
    }

    /// Get search API key from environment variable
    pub fn get_search_api_key(&self) -> Result<String, ConfigError> {
        let section = self.search.as_ref().ok_or_else(|| {
            ConfigError::InvalidConfig("missing [search] section".to_string())
        })?;
        Self::get_env_var_required(&section.api_key_env)
    }

    /// Get mail API credentials from environment variables
    pub fn get_mail_credentials(&self) -> Result<(String, String), ConfigError> {
        let section = self.email.as_ref().ok_or_else(|| {
            ConfigError::InvalidConfig("missing [email] section".to_string())
        })?;
        let key = Self::get_env_var_required(&section.api_key_env)?;
        let secret = Self::get_env_var_required(&section.api_secret_env)?;
        Ok((key, secret))
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[llm]
provider = "openai"
fast_model = "gpt-4o-mini"
capable_model = "gpt-4o"
api_key_env = "OPENAI_API_KEY"
temperature = 0.7
max_tokens = 4000
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}
