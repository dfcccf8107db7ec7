//! A tool-calling agent with a single weather lookup tool.
//!
//! The crate provides:
//! - A weather pipeline (`WeatherLookup`): geocode a place name, then fetch current conditions.
//! - A `Weather` tool wrapping that pipeline for an LLM agent.
//! - A language model abstraction (`LanguageModel`) with a Groq client.
//! - An `Agent` that loops between the model and tools, exposed through the `Orchestrator` trait.
//! - A `QueryDispatcher` that always answers with text.

mod agent;
mod config;
mod error;
mod llm;
mod memory;
mod message;
mod orchestrator;
mod tool;
pub mod tools;

pub use agent::{Agent, AgentRun};
pub use config::{AppConfig, ModelConfig, WeatherConfig};
pub use error::{AgentError, Result};
pub use llm::{GroqClient, LanguageModel, ModelCompletion, StubModel};
pub use memory::ConversationMemory;
pub use message::{Message, Role, ToolCall, ToolResult};
pub use orchestrator::{Orchestrator, QueryDispatcher};
pub use tool::{Tool, ToolDescription, ToolRegistry};
pub use tools::weather::{
    render_lookup_error, weather_toolkit, GeoCoordinate, GeoResolver, WeatherFetcher,
    WeatherLookup, WeatherReading, WeatherReport, WeatherTool,
};
