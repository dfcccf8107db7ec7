//! Weather toolkit.
//!
//! Resolves a place name to coordinates through the OpenWeatherMap geocoding
//! API, then fetches current conditions for those coordinates. Upstream
//! failures never escape the tool: they are rendered into the text the model
//! reads back.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Number, Value};

use crate::config::WeatherConfig;
use crate::error::{AgentError, Result};
use crate::tool::{Tool, ToolRegistry};

pub const WEATHER_TOOL_NAME: &str = "Weather";
pub const WEATHER_TOOL_DESCRIPTION: &str =
    "Useful for getting weather information for a location. Input should be a city name.";

const GEOCODING_SERVICE: &str = "geocoding";
const WEATHER_SERVICE: &str = "weather";

/// Latitude/longitude of the first geocoding match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions in metric units.
///
/// Numbers are kept as the upstream sent them, so `18` and `18.0` render differently.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReading {
    pub temperature: Number,
    pub description: String,
    pub humidity: Number,
}

/// A successful lookup, displayed as the one-sentence summary.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub reading: WeatherReading,
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Current weather in {}: {}, temperature is {}°C with {}% humidity",
            self.location,
            self.reading.description,
            self.reading.temperature,
            self.reading.humidity
        )
    }
}

/// Render any lookup failure into the string handed back to the model.
pub fn render_lookup_error(err: &AgentError) -> String {
    match err {
        AgentError::LocationNotFound(query) => format!("Could not find location: {query}"),
        other => format!("Error getting weather: {other}"),
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainBlock,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: Number,
    humidity: Number,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    service: &str,
) -> Result<T> {
    // Request URLs carry the API key; keep them out of error text.
    let response = request
        .send()
        .await
        .map_err(|err| AgentError::transport(service, err.without_url()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AgentError::transport(
            service,
            format!("server responded with {status}"),
        ));
    }

    let body = response
        .bytes()
        .await
        .map_err(|err| AgentError::transport(service, err.without_url()))?;
    serde_json::from_slice(&body).map_err(|err| AgentError::parse(service, err.to_string()))
}

/// Turns a place name into coordinates.
#[derive(Clone)]
pub struct GeoResolver {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeoResolver {
    pub fn new(http: reqwest::Client, config: &WeatherConfig) -> Self {
        Self {
            http,
            url: config.geocoding_url.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
        }
    }

    pub async fn resolve(&self, query: &str) -> Result<GeoCoordinate> {
        if query.trim().is_empty() {
            return Err(AgentError::LocationNotFound(query.to_string()));
        }

        tracing::debug!(query, "resolving location");
        let request = self.http.get(&self.url).query(&[
            ("q", query),
            ("limit", "1"),
            ("appid", self.api_key.as_str()),
        ]);
        let matches: Vec<GeocodeMatch> = get_json(request, GEOCODING_SERVICE).await?;

        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::LocationNotFound(query.to_string()))?;
        Ok(GeoCoordinate {
            latitude: first.lat,
            longitude: first.lon,
        })
    }
}

/// Fetches current conditions for a coordinate pair.
#[derive(Clone)]
pub struct WeatherFetcher {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl WeatherFetcher {
    pub fn new(http: reqwest::Client, config: &WeatherConfig) -> Self {
        Self {
            http,
            url: config.weather_url.clone(),
            api_key: config.api_key.clone().unwrap_or_default(),
        }
    }

    pub async fn fetch(&self, coordinate: GeoCoordinate) -> Result<WeatherReading> {
        tracing::debug!(
            lat = coordinate.latitude,
            lon = coordinate.longitude,
            "fetching current weather"
        );
        let request = self.http.get(&self.url).query(&[
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ]);
        let body: CurrentWeather = get_json(request, WEATHER_SERVICE).await?;

        let description = body
            .weather
            .into_iter()
            .next()
            .map(|condition| condition.description)
            .ok_or_else(|| AgentError::parse(WEATHER_SERVICE, "missing weather[0].description"))?;

        Ok(WeatherReading {
            temperature: body.main.temp,
            description,
            humidity: body.main.humidity,
        })
    }
}

/// Geocode, then fetch. Both steps share one HTTP client and nothing else.
#[derive(Clone)]
pub struct WeatherLookup {
    resolver: GeoResolver,
    fetcher: WeatherFetcher,
}

impl WeatherLookup {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|err| AgentError::Config(format!("http client error: {err}")))?;
        Ok(Self {
            resolver: GeoResolver::new(http.clone(), config),
            fetcher: WeatherFetcher::new(http, config),
        })
    }

    pub async fn lookup(&self, query: &str) -> Result<WeatherReport> {
        let coordinate = self.resolver.resolve(query).await?;
        let reading = self.fetcher.fetch(coordinate).await?;
        Ok(WeatherReport {
            location: query.to_string(),
            reading,
        })
    }

    /// Like [`lookup`](Self::lookup), with every failure rendered to text.
    pub async fn describe(&self, query: &str) -> String {
        match self.lookup(query).await {
            Ok(report) => report.to_string(),
            Err(err) => {
                tracing::warn!(query, error = %err, "weather lookup failed");
                render_lookup_error(&err)
            }
        }
    }
}

/// The lookup exposed to the agent as the `Weather` tool.
pub struct WeatherTool {
    lookup: WeatherLookup,
}

impl WeatherTool {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            lookup: WeatherLookup::new(config)?,
        })
    }
}

/// Accepts a bare string or `{"location": string}`. Anything else is rendered
/// back to the model as text so it can retry with a city name.
fn location_from_input(input: &Value) -> Result<&str> {
    match input {
        Value::String(location) => Ok(location.as_str()),
        Value::Object(map) => map.get("location").and_then(Value::as_str).ok_or_else(|| {
            AgentError::Protocol(format!("missing `location` for {WEATHER_TOOL_NAME}"))
        }),
        other => Err(AgentError::Protocol(format!(
            "{WEATHER_TOOL_NAME} expects a city name, got `{other}`"
        ))),
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        WEATHER_TOOL_DESCRIPTION
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "City name, e.g. Paris"}
            },
            "required": ["location"]
        }))
    }

    async fn call(&self, input: Value) -> Result<Value> {
        let text = match location_from_input(&input) {
            Ok(location) => self.lookup.describe(location).await,
            Err(err) => {
                tracing::warn!(input = %input, error = %err, "unusable weather tool input");
                render_lookup_error(&err)
            }
        };
        Ok(Value::String(text))
    }
}

/// Create a toolkit holding only the `Weather` tool.
pub fn weather_toolkit(config: &WeatherConfig) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(WeatherTool::new(config)?);
    Ok(registry)
}
