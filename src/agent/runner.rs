//! Agent runner with tool calling loop.

use super::structured::StructuredAgentResponse;
use super::tools::{parse_tool_call, ToolContext};
use crate::config::{AgentSettings, HttpSettings};
use crate::error::{AjudanteError, Result};
use crate::history::{Message, Role};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use tracing::{debug, info};

/// Agent that lets the model call weather, search and calendar tools.
pub struct Agent {
    client: Client<OpenAIConfig>,
    model: String,
    tools: ToolContext,
    max_iterations: usize,
    system_prompt: String,
    structured: bool,
}

impl Agent {
    /// Create an agent from settings and a resolved API key.
    pub fn new(
        tools: ToolContext,
        api_key: &str,
        agent: &AgentSettings,
        http: &HttpSettings,
    ) -> Result<Self> {
        Ok(Self::with_client(create_client(api_key, http)?, tools, &agent.model)
            .with_system_prompt(&agent.system_prompt)
            .with_max_iterations(agent.max_iterations))
    }

    /// Create an agent around an existing client.
    pub fn with_client(client: Client<OpenAIConfig>, tools: ToolContext, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            tools,
            max_iterations: 15,
            system_prompt: AgentSettings::default().system_prompt,
            structured: false,
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Require the final answer to match [`StructuredAgentResponse`].
    pub fn with_structured_output(mut self, structured: bool) -> Self {
        self.structured = structured;
        self
    }

    /// Run one turn: prior `history`, then the user's `input`.
    pub async fn run(&self, input: &str, history: &[Message]) -> Result<AgentResponse> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![to_request_message(&Message::system(self.system_prompt.as_str()))?];

        for message in history {
            if message.role == Role::Tool {
                debug!("Skipping tool message from history");
                continue;
            }
            messages.push(to_request_message(message)?);
        }
        messages.push(to_request_message(&Message::user(input))?);

        let tools = self.tools.definitions();
        let mut turn_messages = Vec::new();
        let mut tool_calls_made = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(AjudanteError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}, {} messages", iterations, messages.len());

            let mut builder = CreateChatCompletionRequestArgs::default();
            builder.model(&self.model).messages(messages.clone());
            if !tools.is_empty() {
                builder.tools(tools.clone());
            }
            if self.structured {
                builder.response_format(StructuredAgentResponse::response_format());
            }
            let request = builder
                .build()
                .map_err(|e| AjudanteError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| AjudanteError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| AjudanteError::Agent("No response from model".to_string()))?;

            let tool_calls = choice.message.tool_calls.as_deref().unwrap_or_default();

            if tool_calls.is_empty() {
                if let (None, Some(refusal)) = (&choice.message.content, &choice.message.refusal) {
                    return Err(AjudanteError::Agent(format!("Model refused: {}", refusal)));
                }

                let content = choice.message.content.clone().unwrap_or_default();
                let structured = if self.structured {
                    Some(StructuredAgentResponse::parse(&content)?)
                } else {
                    None
                };

                turn_messages.push(Message::assistant(content.as_str()));
                return Ok(AgentResponse {
                    content,
                    messages: turn_messages,
                    tool_calls: tool_calls_made,
                    iterations,
                    structured,
                });
            }

            // Add assistant message with tool calls to the request history
            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.to_vec())
                .build()
                .map_err(|e| AjudanteError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| AjudanteError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                turn_messages.push(Message::tool(record.name.as_str(), record.result.as_str()));
                tool_calls_made.push(record);
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let result = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => output,
                Err(e) => format!("Tool error: {}", e),
            },
            Err(e) => format!("Failed to parse tool call: {}", e),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
        }
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.clone();
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AjudanteError::Agent(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AjudanteError::Agent(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AjudanteError::Agent(e.to_string()))?
            .into(),
        Role::Tool => {
            return Err(AjudanteError::Agent(
                "Tool results cannot be replayed without their call id".to_string(),
            ))
        }
    };
    Ok(built)
}

/// Response from an agent run.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Messages generated during the turn: tool results, then the final answer.
    pub messages: Vec<Message>,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
    /// Schema-validated answer, when structured output was requested.
    pub structured: Option<StructuredAgentResponse>,
}

impl AgentResponse {
    /// The final generated message.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Drop intermediate tool messages, keeping only the final one.
    ///
    /// A response without messages is returned unchanged.
    pub fn into_last_message(mut self) -> Self {
        if let Some(last) = self.messages.pop() {
            self.messages = vec![last];
        }
        self
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(messages: Vec<Message>) -> AgentResponse {
        AgentResponse {
            content: "final".to_string(),
            messages,
            tool_calls: Vec::new(),
            iterations: 1,
            structured: None,
        }
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "get_weather".to_string(),
            arguments: r#"{"city": "toronto"}"#.to_string(),
            result: "{}".to_string(),
        };
        assert_eq!(format!("{}", record), r#"get_weather({"city": "toronto"})"#);
    }

    #[test]
    fn test_into_last_message_keeps_final_only() {
        let extracted = response(vec![
            Message::tool("get_weather", r#"{"temperature":5}"#),
            Message::tool("web_search", "{}"),
            Message::assistant("final"),
        ])
        .into_last_message();

        assert_eq!(extracted.messages, vec![Message::assistant("final")]);
        assert_eq!(extracted.content, "final");
    }

    #[test]
    fn test_into_last_message_single_and_empty() {
        let single = response(vec![Message::assistant("only")]).into_last_message();
        assert_eq!(single.messages, vec![Message::assistant("only")]);

        let empty = response(Vec::new()).into_last_message();
        assert!(empty.messages.is_empty());
        assert_eq!(empty.content, "final");
    }

    #[test]
    fn test_tool_messages_cannot_be_replayed() {
        assert!(to_request_message(&Message::tool("get_weather", "{}")).is_err());
        assert!(to_request_message(&Message::assistant("hi")).is_ok());
    }
}
