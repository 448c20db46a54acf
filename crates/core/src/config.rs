use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_ENABLE_THINKING: &str = "false";
pub const DEFAULT_TEMPERATURE: &str = "0.3";
pub const DEFAULT_MAX_OUTPUT_TOKENS: &str = "1024";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

/// Options as a host hands them to the translator: every value is a string,
/// keys are camelCase when read from a JSON settings object.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub enable_thinking: Option<String>,
    pub temperature: Option<String>,
    pub max_output_tokens: Option<String>,
    pub base_url: Option<String>,
}

impl PluginConfig {
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "**redacted**"))
            .field("model", &self.model)
            .field("enable_thinking", &self.enable_thinking)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Validated settings for one `generateContent` call.
#[derive(Clone, Debug, PartialEq)]
pub struct GeminiSettings {
    pub api_key: ApiKey,
    pub model: String,
    pub thinking_enabled: bool,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub base_url: Url,
}

impl GeminiSettings {
    /// Blank option values are treated the same as absent ones.
    pub fn from_plugin_config(config: &PluginConfig) -> Result<Self, ConfigError> {
        let api_key = ApiKey::new(config.api_key.clone().unwrap_or_default())?;
        let model = option_or(&config.model, DEFAULT_MODEL).to_owned();
        let thinking_enabled =
            parse_bool(option_or(&config.enable_thinking, DEFAULT_ENABLE_THINKING))?;
        let temperature = parse_temperature(option_or(&config.temperature, DEFAULT_TEMPERATURE))?;
        let max_output_tokens =
            parse_max_output_tokens(option_or(&config.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS))?;
        let base_url = parse_base_url(option_or(&config.base_url, DEFAULT_BASE_URL))?;

        Ok(Self {
            api_key,
            model,
            thinking_enabled,
            temperature,
            max_output_tokens,
            base_url,
        })
    }
}

fn option_or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidEnableThinking(value.to_owned())),
    }
}

fn parse_temperature(value: &str) -> Result<f64, ConfigError> {
    match value.parse::<f64>() {
        Ok(t) if t.is_finite() && t >= 0.0 => Ok(t),
        _ => Err(ConfigError::InvalidTemperature(value.to_owned())),
    }
}

fn parse_max_output_tokens(value: &str) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidMaxOutputTokens(value.to_owned())),
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidBaseUrl(format!("{value}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "{value}: unsupported scheme {}",
            url.scheme()
        )));
    }
    Ok(url)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no http transport was provided")]
    MissingTransport,
    #[error("missing apiKey")]
    MissingApiKey,
    #[error("enableThinking must be \"true\" or \"false\", got {0:?}")]
    InvalidEnableThinking(String),
    #[error("temperature must be a non-negative number, got {0:?}")]
    InvalidTemperature(String),
    #[error("maxOutputTokens must be a positive integer, got {0:?}")]
    InvalidMaxOutputTokens(String),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}

pub fn resolve_optional_string(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Option<String> {
    match cli_value {
        Some(v) => Some(v),
        None => env.var(env_key),
    }
}
