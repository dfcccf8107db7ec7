use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The geocoder answered with no match. Not a fault, just an empty lookup.
    #[error("could not find location: {0}")]
    LocationNotFound(String),

    #[error("{service} request failed: {message}")]
    Transport { service: String, message: String },

    #[error("{service} response malformed: {message}")]
    Parse { service: String, message: String },

    #[error("orchestrator failed: {0}")]
    Orchestrator(String),

    #[error("tool `{0}` not found")]
    ToolNotFound(String),

    #[error("tool `{name}` invocation failed: {source}")]
    ToolInvocation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("language model error: {0}")]
    LanguageModel(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub(crate) fn transport(service: &str, err: impl std::fmt::Display) -> Self {
        AgentError::Transport {
            service: service.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(service: &str, message: impl Into<String>) -> Self {
        AgentError::Parse {
            service: service.to_string(),
            message: message.into(),
        }
    }
}
