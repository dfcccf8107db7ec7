//! Tools module - toolkits the agent can call.
//!
//! - Weather: geocode a city name, then report its current conditions

pub mod weather;

pub use weather::{weather_toolkit, WeatherTool, WEATHER_TOOL_DESCRIPTION, WEATHER_TOOL_NAME};
