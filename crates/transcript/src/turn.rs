//! Turn types for the transcript.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A remote tool invocation the model made while answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub function_name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ToolCall {
    pub fn new(function_name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            function_name: function_name.into(),
            parameters,
        }
    }
}

/// One recorded exchange in the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub function_calls: Option<Vec<ToolCall>>,
}

impl Turn {
    /// A user query. User turns carry no tool calls.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            function_calls: None,
        }
    }

    /// An assistant reply with the tool calls made while producing it.
    pub fn assistant(content: impl Into<String>, function_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            function_calls: Some(function_calls),
        }
    }
}

/// Caller-facing view of a [`Turn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub function_calls: Vec<ToolCall>,
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
            function_calls: turn.function_calls.clone().unwrap_or_default(),
        }
    }
}
