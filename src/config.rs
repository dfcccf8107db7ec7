use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::llm::{GROQ_BASE_URL, GROQ_DEFAULT_MODEL};

pub const DEFAULT_GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Settings for the geocoding and current-weather endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            geocoding_url: default_geocoding_url(),
            weather_url: default_weather_url(),
        }
    }
}

impl WeatherConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point both endpoints at one host, e.g. a mock server in tests.
    pub fn with_base_url(mut self, base: impl AsRef<str>) -> Self {
        let base = base.as_ref().trim_end_matches('/');
        self.geocoding_url = format!("{base}/geo/1.0/direct");
        self.weather_url = format!("{base}/data/2.5/weather");
        self
    }
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.into()
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: 0.0,
            max_steps: default_max_steps(),
        }
    }
}

fn default_provider() -> String {
    "groq".into()
}

fn default_model() -> String {
    GROQ_DEFAULT_MODEL.into()
}

fn default_max_steps() -> usize {
    6
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = toml::from_str(&raw)
            .map_err(|err| AgentError::Config(format!("Failed to parse configuration: {err}")))?;
        Ok(cfg)
    }

    /// Defaults plus environment overrides. Missing keys are left unset.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env();
        cfg
    }

    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::from_file(path)?;
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    /// Applies `OPENWEATHER_API_KEY`, `GROQ_API_KEY` and the `WEATHER_AGENT_*`
    /// overrides, reading each name through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENWEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(url) = lookup("WEATHER_AGENT_GEOCODING_URL") {
            self.weather.geocoding_url = url;
        }
        if let Some(url) = lookup("WEATHER_AGENT_WEATHER_URL") {
            self.weather.weather_url = url;
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(model) = lookup("WEATHER_AGENT_MODEL") {
            self.model.model = model;
        }
        if let Some(url) = lookup("WEATHER_AGENT_LLM_BASE_URL") {
            self.model.base_url = Some(url);
        }
    }
}
