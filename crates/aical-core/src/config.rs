//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `aical.toml` configuration file
//! 3. Default values
//!
//! `${VAR_NAME}` references inside the configuration file are expanded
//! from the environment before parsing.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "aical.toml";

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API
    #[default]
    Gemini,
    /// OpenAI-compatible chat completions API
    OpenAi,
}

impl LlmProvider {
    /// Parse a provider name; anything unrecognised falls back to Gemini
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "openai" | "openai-compatible" | "groq" | "ollama" => LlmProvider::OpenAi,
            _ => LlmProvider::Gemini,
        }
    }

    /// Base URL used when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            LlmProvider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::Gemini,
            base_url: None,
        }
    }
}

impl LlmConfig {
    /// Base URL for requests, falling back to the provider default
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Port for HTTP API server
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Allowed CORS origins
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Public URL advertised in the agent card
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            allowed_origins: default_allowed_origins(),
            public_url: None,
        }
    }
}

impl ApiConfig {
    /// URL advertised to clients
    pub fn advertised_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

/// External calendar backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Base URL of the calendar backend service
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// IANA zone used when a request does not name one
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            default_timezone: default_timezone(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_backend_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_timezone() -> String {
    "Asia/Bangkok".to_string()
}

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Calendar backend configuration
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Config {
    /// Replace `${VAR_NAME}` with the value of the environment variable.
    ///
    /// Unknown variables expand to an empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file.
    ///
    /// Environment variables override values from the file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&Self::expand_env_vars(&toml_content))?;
        cfg.apply_overrides(|name| std::env::var(name).ok());

        Ok(cfg)
    }

    /// Parse configuration from TOML text without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let toml: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(Self::from_toml_config(toml))
    }

    /// Load configuration from the default location.
    ///
    /// Uses `./aical.toml` when present, otherwise the environment only.
    pub fn load() -> Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }

        Self::from_env()
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let llm = toml.llm.unwrap_or_default();
        let llm_config = LlmConfig {
            api_key: llm.api_key.unwrap_or_default(),
            model: llm.model.unwrap_or_else(default_model),
            provider: llm
                .provider
                .map(|p| LlmProvider::parse(&p))
                .unwrap_or_default(),
            base_url: llm.base_url,
        };

        let api = toml.api.unwrap_or_default();
        let api_config = ApiConfig {
            port: api.port.unwrap_or_else(default_api_port),
            allowed_origins: api.allowed_origins.unwrap_or_else(default_allowed_origins),
            public_url: api.public_url,
        };

        let calendar = toml.calendar.unwrap_or_default();
        let calendar_config = CalendarConfig {
            backend_url: calendar.backend_url.unwrap_or_else(default_backend_url),
            default_timezone: calendar.default_timezone.unwrap_or_else(default_timezone),
        };

        Config {
            llm: llm_config,
            api: api_config,
            calendar: calendar_config,
        }
    }

    /// Override settings from variables resolved through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = non_empty("LLM_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
            self.llm.api_key = api_key;
        }
        if let Some(model) = non_empty("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = non_empty("LLM_PROVIDER") {
            self.llm.provider = LlmProvider::parse(&provider);
        }
        if let Some(base_url) = non_empty("LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        if let Some(port) = non_empty("API_PORT").and_then(|p| p.trim().parse().ok()) {
            self.api.port = port;
        }
        if let Some(origins) = non_empty("API_ALLOWED_ORIGINS") {
            self.api.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(url) = non_empty("API_PUBLIC_URL") {
            self.api.public_url = Some(url);
        }

        if let Some(url) = non_empty("CALENDAR_BACKEND_URL") {
            self.calendar.backend_url = url;
        }
        if let Some(tz) = non_empty("DEFAULT_TIMEZONE") {
            self.calendar.default_timezone = tz;
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_overrides(|name| std::env::var(name).ok());

        if config.llm.api_key.is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEY or LLM_API_KEY not set".to_string(),
            ));
        }

        Ok(config)
    }

    /// Get the effective LLM configuration
    pub fn llm_config(&self) -> &LlmConfig {
        &self.llm
    }
}

// ============================================================================
// TOML file structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct TomlConfig {
    llm: Option<TomlLlmConfig>,
    api: Option<TomlApiConfig>,
    calendar: Option<TomlCalendarConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLlmConfig {
    /// "gemini" or "openai"
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlApiConfig {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    allowed_origins: Option<Vec<String>>,
    #[serde(default)]
    public_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlCalendarConfig {
    #[serde(default)]
    backend_url: Option<String>,
    #[serde(default)]
    default_timezone: Option<String>,
}
