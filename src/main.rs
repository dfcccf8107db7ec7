use std::env;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use weather_agent::{
    weather_toolkit, Agent, AgentError, AppConfig, GroqClient, Orchestrator, QueryDispatcher,
    StubModel,
};

const EXAMPLE_QUERY: &str = "What's the purpose of water bottles?";

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("weather_agent=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config() -> weather_agent::Result<AppConfig> {
    match env::var("WEATHER_AGENT_CONFIG") {
        Ok(path) => AppConfig::from_env_or_file(path),
        Err(_) => Ok(AppConfig::from_env()),
    }
}

fn build_orchestrator(cfg: &AppConfig) -> weather_agent::Result<Arc<dyn Orchestrator>> {
    let tools = weather_toolkit(&cfg.weather)?;
    let max_steps = cfg.model.max_steps;
    let orchestrator: Arc<dyn Orchestrator> = match cfg.model.provider.as_str() {
        "stub" => {
            let model = StubModel::new(vec![
                r#"{"action":"respond","content":"Water bottles let you carry drinking water with you."}"#
                    .into(),
            ]);
            Arc::new(Agent::new(model).with_tools(tools).with_max_steps(max_steps))
        }
        "groq" => {
            let model = Arc::new(GroqClient::from_config(&cfg.model)?);
            Arc::new(Agent::new(model).with_tools(tools).with_max_steps(max_steps))
        }
        other => {
            return Err(AgentError::Config(format!(
                "unknown model provider `{other}` (expected `groq` or `stub`)"
            )));
        }
    };
    tracing::info!(provider = %cfg.model.provider, model = %cfg.model.model, "agent ready");
    Ok(orchestrator)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    println!("\nTesting weather agent:");
    println!("Query: {EXAMPLE_QUERY}");

    let response = match load_config().and_then(|cfg| build_orchestrator(&cfg)) {
        Ok(orchestrator) => QueryDispatcher::new(orchestrator).process_query(EXAMPLE_QUERY).await,
        Err(err) => format!("Error processing query: {err}"),
    };
    println!("Response: {response}");
}
