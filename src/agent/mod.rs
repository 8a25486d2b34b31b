//! Agent system for answering with tool calling.
//!
//! Provides an LLM agent that can check the weather, search the web and
//! create calendar events, optionally replaying a session's history and
//! returning a schema-validated answer.

mod runner;
mod session;
mod structured;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use session::Session;
pub use structured::{Source, StructuredAgentResponse, Weather};
pub use tools::{
    capital_request, news_request, parse_tool_call, tool_definitions, ToolCall, ToolContext,
    EVENT_NOT_CREATED,
};
