use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::llm::LanguageModel;
use crate::memory::ConversationMemory;
use crate::message::Message;
use crate::orchestrator::Orchestrator;
use crate::tool::ToolRegistry;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the user's question \
directly. When the question is about current weather somewhere, call the Weather tool with \
the city name and base your answer on its result.";

/// Final answer of a run plus the transcript that produced it.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub output: String,
    pub transcript: ConversationMemory,
}

/// A tool-calling agent that alternates between the LLM and registered tools.
///
/// Every run starts from an empty transcript, so runs never see each other.
pub struct Agent<M: LanguageModel> {
    system_prompt: String,
    model: Arc<M>,
    tools: ToolRegistry,
    max_steps: usize,
}

impl<M: LanguageModel> Agent<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model,
            tools: ToolRegistry::new(),
            max_steps: 6,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Run a single exchange with the agent.
    pub async fn run(&self, user_input: impl Into<String>) -> Result<AgentRun> {
        let mut memory = ConversationMemory::default();
        memory.push(Message::system(&self.system_prompt));
        memory.push(Message::user(user_input));
        let tools = self.tools.describe();

        for step in 0..self.max_steps {
            let completion = self
                .model
                .complete_chat(memory.as_slice(), &tools)
                .await?;

            if completion.tool_calls.is_empty() {
                let output = completion.content.unwrap_or_default();
                tracing::info!(step, "agent produced final answer");
                memory.push(Message::assistant(&output));
                return Ok(AgentRun {
                    output,
                    transcript: memory,
                });
            }

            let calls = completion.tool_calls;
            memory.push(Message::assistant_tool_calls(
                completion.content,
                calls.clone(),
            ));
            for call in &calls {
                tracing::info!(step, tool = %call.name, arguments = %call.arguments, "calling tool");
                let output = self.tools.call(&call.name, call.arguments.clone()).await?;
                tracing::info!(step, tool = %call.name, output = %output, "tool returned");
                memory.push(Message::tool(call, output));
            }
        }

        Err(AgentError::Protocol(
            "Agent reached the step limit without returning a response".into(),
        ))
    }
}

#[async_trait]
impl<M: LanguageModel> Orchestrator for Agent<M> {
    async fn invoke(&self, query: &str) -> Result<String> {
        self.run(query)
            .await
            .map(|run| run.output)
            .map_err(|err| AgentError::Orchestrator(err.to_string()))
    }
}
