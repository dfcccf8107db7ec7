//! The seam between callers and whatever answers natural-language queries.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// Anything that can turn a natural-language query into a final answer.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn invoke(&self, query: &str) -> Result<String>;
}

/// Hands queries to an orchestrator and always answers with text.
pub struct QueryDispatcher {
    orchestrator: Arc<dyn Orchestrator>,
}

impl QueryDispatcher {
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn process_query(&self, query: &str) -> String {
        match self.orchestrator.invoke(query).await {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(query, error = %err, "query processing failed");
                format!("Error processing query: {err}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    struct Fixed(&'static str);

    #[async_trait]
    impl Orchestrator for Fixed {
        async fn invoke(&self, _query: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl Orchestrator for Failing {
        async fn invoke(&self, _query: &str) -> Result<String> {
            Err(AgentError::Orchestrator("model unavailable".into()))
        }
    }

    #[tokio::test]
    async fn passes_answers_through() {
        let dispatcher = QueryDispatcher::new(Arc::new(Fixed("Water bottles hold water.")));
        assert_eq!(
            dispatcher.process_query("What are water bottles for?").await,
            "Water bottles hold water."
        );
    }

    #[tokio::test]
    async fn renders_failures_as_text() {
        let dispatcher = QueryDispatcher::new(Arc::new(Failing));
        let text = dispatcher.process_query("anything").await;
        assert_eq!(
            text,
            "Error processing query: orchestrator failed: model unavailable"
        );
    }

    #[tokio::test]
    async fn shares_one_orchestrator_between_dispatchers() {
        let shared: Arc<dyn Orchestrator> = Arc::new(Fixed("same"));
        let first = QueryDispatcher::new(shared.clone());
        let second = QueryDispatcher::new(shared);
        assert_eq!(
            first.process_query("q").await,
            second.process_query("q").await
        );
    }
}
