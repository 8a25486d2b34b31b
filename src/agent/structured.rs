//! Structured agent answers.

use crate::error::{AjudanteError, Result};
use async_openai::types::{ResponseFormat, ResponseFormatJsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::json;

const SCHEMA_NAME: &str = "agent_response";

/// A source the answer was drawn from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name_source: String,
    pub url: String,
}

/// Temperature reading included with weather answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Degrees Celsius.
    pub temperature: f64,
}

/// Final answer in schema-validated form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAgentResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub weather: Option<Weather>,
}

impl StructuredAgentResponse {
    /// JSON schema in the strict form the chat API accepts: every property
    /// required, optional ones nullable.
    pub fn json_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "answer": {
                    "type": "string",
                    "description": "The answer"
                },
                "sources": {
                    "type": ["array", "null"],
                    "description": "Sources used, if any",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name_source": { "type": "string", "description": "Name of the source" },
                            "url": { "type": "string", "description": "URL of the source" }
                        },
                        "required": ["name_source", "url"],
                        "additionalProperties": false
                    }
                },
                "weather": {
                    "anyOf": [
                        {
                            "type": "object",
                            "properties": {
                                "temperature": {
                                    "type": "number",
                                    "description": "Temperature in degrees Celsius"
                                }
                            },
                            "required": ["temperature"],
                            "additionalProperties": false
                        },
                        { "type": "null" }
                    ]
                }
            },
            "required": ["answer", "sources", "weather"],
            "additionalProperties": false
        })
    }

    /// Response format requesting this schema.
    pub fn response_format() -> ResponseFormat {
        ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("Answer with optional sources and weather".to_string()),
                name: SCHEMA_NAME.to_string(),
                schema: Some(Self::json_schema()),
                strict: Some(true),
            },
        }
    }

    /// Validate the model's final content against the schema.
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| {
            AjudanteError::Agent(format!("Answer does not match the response schema: {}", e))
        })
    }
}
