//! Tool definitions and implementations for the agent system.

use crate::calendar::{CalendarEvent, CalendarProvider};
use crate::error::{AjudanteError, Result};
use crate::search::{SearchDepth, SearchProvider, SearchRequest, SearchTopic};
use crate::weather::WeatherProvider;
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Tool output when the calendar does not confirm an event.
pub const EVENT_NOT_CREATED: &str = "Event not created";

const TOOL_NAMES: [&str; 5] = ["get_weather", "web_search", "get_capital", "get_news", "create_event"];

/// Available tools for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Realtime weather of a city.
    GetWeather { city: String },

    /// Free-text web search.
    WebSearch {
        query: String,
        #[serde(default)]
        search_depth: SearchDepth,
        #[serde(default = "default_max_results")]
        max_results: u32,
    },

    /// Capital of a country, via web search.
    GetCapital { country: String },

    /// Recent news about a topic, via web search.
    GetNews { topic: String },

    /// Insert an event in the user's calendar.
    CreateEvent(CalendarEvent),
}

fn default_max_results() -> u32 {
    5
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::GetWeather { .. } => "get_weather",
            ToolCall::WebSearch { .. } => "web_search",
            ToolCall::GetCapital { .. } => "get_capital",
            ToolCall::GetNews { .. } => "get_news",
            ToolCall::CreateEvent(_) => "create_event",
        }
    }
}

/// Search request behind `get_capital`.
pub fn capital_request(country: &str) -> SearchRequest {
    SearchRequest::new(format!("What is the capital of {}?", country))
        .with_depth(SearchDepth::UltraFast)
        .with_max_results(1)
}

/// Search request behind `get_news`, limited to the last `lookback_days`.
pub fn news_request(topic: &str, today: NaiveDate, lookback_days: u32) -> SearchRequest {
    SearchRequest::new(format!("What is the news most recent about {}?", topic))
        .with_depth(SearchDepth::Fast)
        .with_max_results(3)
        .with_topic(SearchTopic::News)
        .since(today - Duration::days(i64::from(lookback_days)))
}

/// Tool execution context. Each provider is optional; tools whose provider is
/// missing are not offered to the model.
#[derive(Clone)]
pub struct ToolContext {
    pub weather: Option<Arc<dyn WeatherProvider>>,
    pub search: Option<Arc<dyn SearchProvider>>,
    pub calendar: Option<Arc<dyn CalendarProvider>>,
    pub news_lookback_days: u32,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            weather: None,
            search: None,
            calendar: None,
            news_lookback_days: 7,
        }
    }
}

impl ToolContext {
    /// Create an empty tool context.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weather(mut self, weather: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarProvider>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn with_news_lookback_days(mut self, days: u32) -> Self {
        self.news_lookback_days = days;
        self
    }

    /// Names of the tools this context can execute.
    pub fn available(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.weather.is_some() {
            names.push("get_weather");
        }
        if self.search.is_some() {
            names.extend(["web_search", "get_capital", "get_news"]);
        }
        if self.calendar.is_some() {
            names.push("create_event");
        }
        names
    }

    /// Tool definitions for the tools this context can execute.
    pub fn definitions(&self) -> Vec<ChatCompletionTool> {
        let available = self.available();
        tool_definitions()
            .into_iter()
            .filter(|tool| available.iter().any(|name| *name == tool.function.name))
            .collect()
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::GetWeather { city } => self.execute_get_weather(city).await,
            ToolCall::WebSearch {
                query,
                search_depth,
                max_results,
            } => {
                let request = SearchRequest::new(query.as_str())
                    .with_depth(*search_depth)
                    .with_max_results(*max_results);
                self.execute_search(&request).await
            }
            ToolCall::GetCapital { country } => self.execute_search(&capital_request(country)).await,
            ToolCall::GetNews { topic } => {
                let today = Local::now().date_naive();
                self.execute_search(&news_request(topic, today, self.news_lookback_days))
                    .await
            }
            ToolCall::CreateEvent(event) => self.execute_create_event(event).await,
        }
    }

    async fn execute_get_weather(&self, city: &str) -> Result<String> {
        let weather = self.weather.as_ref().ok_or_else(|| not_configured("get_weather"))?;
        let outcome = weather.realtime(city).await?;
        Ok(outcome.to_string())
    }

    async fn execute_search(&self, request: &SearchRequest) -> Result<String> {
        let search = self.search.as_ref().ok_or_else(|| not_configured("web search"))?;
        let results = search.search(request).await?;
        Ok(results.to_string())
    }

    async fn execute_create_event(&self, event: &CalendarEvent) -> Result<String> {
        let calendar = self.calendar.as_ref().ok_or_else(|| not_configured("create_event"))?;

        match calendar.insert_event(event).await {
            Ok(created) => Ok(created.raw.to_string()),
            Err(AjudanteError::EventNotCreated { status }) => {
                debug!("Calendar did not confirm event (status: {:?})", status);
                Ok(EVENT_NOT_CREATED.to_string())
            }
            Err(e) => Err(e),
        }
    }
}

fn not_configured(tool: &str) -> AjudanteError {
    AjudanteError::Agent(format!("Tool '{}' is not configured", tool))
}

fn function_tool(name: &str, description: &str, parameters: serde_json::Value) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: name.to_string(),
            description: Some(description.to_string()),
            parameters: Some(parameters),
            strict: None,
        },
    }
}

/// Get OpenAI function/tool definitions for every tool.
pub fn tool_definitions() -> Vec<ChatCompletionTool> {
    vec![
        function_tool(
            "get_weather",
            "Get realtime weather of a city.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name, e.g. 'toronto'"
                    }
                },
                "required": ["city"]
            }),
        ),
        function_tool(
            "web_search",
            "Search the web and return the raw results. \
            Use this for anything that needs current information.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    },
                    "search_depth": {
                        "type": "string",
                        "enum": ["ultra-fast", "fast", "medium", "advanced"],
                        "description": "How thorough the search should be (default: fast)"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 5)",
                        "default": 5
                    }
                },
                "required": ["query"]
            }),
        ),
        function_tool(
            "get_capital",
            "Get the capital of a country.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "country": {
                        "type": "string",
                        "description": "Country name"
                    }
                },
                "required": ["country"]
            }),
        ),
        function_tool(
            "get_news",
            "Get the most recent news about this topic.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "topic": {
                        "type": "string",
                        "description": "Topic to look up"
                    }
                },
                "required": ["topic"]
            }),
        ),
        function_tool(
            "create_event",
            "Create an event in the user's Google Calendar. \
            Returns the created event (with 'htmlLink') or 'Event not created'.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "year": { "type": "integer", "description": "Year of the event (e.g. 2026)" },
                    "month": { "type": "integer", "description": "Month (1-12)" },
                    "day": { "type": "integer", "description": "Day of month (1-31)" },
                    "start_hour": { "type": "integer", "description": "Start hour, 24h format (0-23)" },
                    "start_minute": { "type": "integer", "description": "Start minute (0-59)" },
                    "end_hour": { "type": "integer", "description": "End hour, 24h format (0-23)" },
                    "end_minute": { "type": "integer", "description": "End minute (0-59)" },
                    "summary": { "type": "string", "description": "Title shown in the calendar" },
                    "description": { "type": "string", "description": "Event details (may be empty)" }
                },
                "required": [
                    "year", "month", "day",
                    "start_hour", "start_minute", "end_hour", "end_minute",
                    "summary", "description"
                ]
            }),
        ),
    ]
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    if !TOOL_NAMES.contains(&name) {
        return Err(AjudanteError::Agent(format!("Unknown tool: {}", name)));
    }

    let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
    let mut args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| AjudanteError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let object = args
        .as_object_mut()
        .ok_or_else(|| AjudanteError::Agent("Tool arguments must be a JSON object".to_string()))?;
    object.insert("name".to_string(), serde_json::Value::String(name.to_string()));

    serde_json::from_value(args)
        .map_err(|e| AjudanteError::Agent(format!("Invalid arguments for '{}': {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CreatedEvent;
    use crate::weather::WeatherOutcome;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct FixedWeather(WeatherOutcome);

    #[async_trait]
    impl WeatherProvider for FixedWeather {
        async fn realtime(&self, _city: &str) -> Result<WeatherOutcome> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingSearch {
        requests: Mutex<Vec<SearchRequest>>,
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        async fn search(&self, request: &SearchRequest) -> Result<Value> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(json!({"results": []}))
        }
    }

    struct StatusCalendar(&'static str);

    #[async_trait]
    impl CalendarProvider for StatusCalendar {
        async fn insert_event(&self, _event: &CalendarEvent) -> Result<CreatedEvent> {
            CreatedEvent::from_response(json!({"status": self.0, "htmlLink": "https://x"}))
        }
    }

    fn event_args() -> &'static str {
        r#"{"year": 2026, "month": 1, "day": 26, "start_hour": 10, "start_minute": 0,
            "end_hour": 11, "end_minute": 0, "summary": "Planning", "description": ""}"#
    }

    #[test]
    fn test_parse_weather_tool() {
        let tool = parse_tool_call("get_weather", r#"{"city": "toronto"}"#).unwrap();
        assert_eq!(tool, ToolCall::GetWeather { city: "toronto".to_string() });
    }

    #[test]
    fn test_parse_search_defaults() {
        let tool = parse_tool_call("web_search", r#"{"query": "rust 2026"}"#).unwrap();
        match tool {
            ToolCall::WebSearch {
                query,
                search_depth,
                max_results,
            } => {
                assert_eq!(query, "rust 2026");
                assert_eq!(search_depth, SearchDepth::Fast);
                assert_eq!(max_results, 5);
            }
            _ => panic!("Expected WebSearch tool"),
        }
    }

    #[test]
    fn test_parse_create_event_tool() {
        let tool = parse_tool_call("create_event", event_args()).unwrap();
        match tool {
            ToolCall::CreateEvent(event) => {
                assert_eq!(event.day, 26);
                assert_eq!(event.end_hour, 11);
                assert_eq!(event.summary, "Planning");
            }
            _ => panic!("Expected CreateEvent tool"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_tool_call("list_videos", "{}").is_err());
        assert!(parse_tool_call("get_weather", "{}").is_err());
        assert!(parse_tool_call("get_weather", "not json").is_err());
        assert!(parse_tool_call("get_weather", "[]").is_err());
    }

    #[test]
    fn test_news_request() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        let request = news_request("eleições", today, 7);

        assert_eq!(request.query, "What is the news most recent about eleições?");
        assert_eq!(request.search_depth, SearchDepth::Fast);
        assert_eq!(request.max_results, 3);
        assert_eq!(request.topic, Some(SearchTopic::News));
        assert_eq!(request.start_date, NaiveDate::from_ymd_opt(2026, 1, 9));
    }

    #[test]
    fn test_default_context_matches_new() {
        let context = ToolContext::default();
        assert_eq!(context.news_lookback_days, 7);
        assert_eq!(ToolContext::new().news_lookback_days, 7);
        assert!(context.available().is_empty());
    }

    #[test]
    fn test_definitions_follow_configured_providers() {
        let context = ToolContext::new().with_weather(Arc::new(FixedWeather(
            WeatherOutcome::Failed { status: 500 },
        )));
        let names: Vec<String> = context
            .definitions()
            .into_iter()
            .map(|t| t.function.name)
            .collect();
        assert_eq!(names, vec!["get_weather"]);
        assert_eq!(tool_definitions().len(), TOOL_NAMES.len());
    }

    #[tokio::test]
    async fn test_weather_failure_is_string_output() {
        let context = ToolContext::new().with_weather(Arc::new(FixedWeather(
            WeatherOutcome::Failed { status: 429 },
        )));
        let output = context
            .execute(&ToolCall::GetWeather { city: "toronto".to_string() })
            .await
            .unwrap();
        assert_eq!(output, "Erro: status code 429");
    }

    #[tokio::test]
    async fn test_capital_uses_ultra_fast_single_result() {
        let search = Arc::new(RecordingSearch::default());
        let context = ToolContext::new().with_search(search.clone());

        context
            .execute(&ToolCall::GetCapital { country: "Brazil".to_string() })
            .await
            .unwrap();

        let requests = search.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, "What is the capital of Brazil?");
        assert_eq!(requests[0].search_depth, SearchDepth::UltraFast);
        assert_eq!(requests[0].max_results, 1);
    }

    #[tokio::test]
    async fn test_create_event_outputs() {
        let event = match parse_tool_call("create_event", event_args()).unwrap() {
            ToolCall::CreateEvent(event) => event,
            _ => unreachable!(),
        };

        let confirmed = ToolContext::new().with_calendar(Arc::new(StatusCalendar("confirmed")));
        let output = confirmed.execute(&ToolCall::CreateEvent(event.clone())).await.unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["htmlLink"], "https://x");

        let tentative = ToolContext::new().with_calendar(Arc::new(StatusCalendar("tentative")));
        let output = tentative.execute(&ToolCall::CreateEvent(event)).await.unwrap();
        assert_eq!(output, EVENT_NOT_CREATED);
    }

    #[tokio::test]
    async fn test_unconfigured_tool_errors() {
        let context = ToolContext::new();
        let err = context
            .execute(&ToolCall::GetNews { topic: "rust".to_string() })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
