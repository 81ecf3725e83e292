//! Gemini `generateContent` wire types.
//!
//! Field names follow the REST API (camelCase). Parts are kept as the flat
//! object the API sends, with fields this crate does not interpret (inline
//! data, executable code and the like) held in [`Part::extra`] so they survive
//! being replayed back to the model; [`Part::kind`] gives the typed view.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a [`Content`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    #[serde(other)]
    Other,
}

/// One turn of content sent to or received from the model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// User content with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            parts: vec![Part::text(text)],
        }
    }

    /// Role-less content with a single text part, as used for system instructions.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    pub fn is_model(&self) -> bool {
        self.role == Some(Role::Model)
    }

    /// Function calls carried by this content, in part order.
    pub fn function_calls(&self) -> impl Iterator<Item = &FunctionCall> {
        self.parts.iter().filter_map(|part| match part.kind() {
            PartKind::FunctionCall(call) => Some(call),
            _ => None,
        })
    }
}

/// A single part of a [`Content`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Set on parts that carry the model's internal reasoning.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
    /// Fields not modelled above, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed view of a [`Part`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartKind<'a> {
    Text(&'a str),
    Thought(&'a str),
    FunctionCall(&'a FunctionCall),
    FunctionResponse(&'a FunctionResponse),
    Other,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn function_call(call: FunctionCall) -> Self {
        Self {
            function_call: Some(call),
            ..Self::default()
        }
    }

    pub fn function_response(response: FunctionResponse) -> Self {
        Self {
            function_response: Some(response),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> PartKind<'_> {
        if let Some(call) = &self.function_call {
            return PartKind::FunctionCall(call);
        }
        if let Some(response) = &self.function_response {
            return PartKind::FunctionResponse(response);
        }
        match &self.text {
            Some(text) if self.thought => PartKind::Thought(text),
            Some(text) => PartKind::Text(text),
            None => PartKind::Other,
        }
    }
}

/// A function call predicted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
}

/// The result of a function call, sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: Value,
}

/// A function the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Parameters as a JSON Schema object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_json_schema: Option<Value>,
}

/// A group of function declarations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    /// Token budget for internal reasoning; `-1` lets the model decide.
    pub thinking_budget: i32,
}

impl ThinkingConfig {
    /// No explicit cap on reasoning.
    pub const DYNAMIC: Self = Self {
        thinking_budget: -1,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub thoughts_token_count: u32,
}

/// Result of a `generateContent` call.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    /// Contents exchanged while tools were called automatically.
    ///
    /// Filled in by [`Client`](crate::Client), never by the API. `None` when
    /// the model answered without calling any function.
    #[serde(skip)]
    pub automatic_function_calling_history: Option<Vec<Content>>,
}

impl GenerateContentResponse {
    /// Content of the first candidate.
    pub fn content(&self) -> Option<&Content> {
        self.candidates.first()?.content.as_ref()
    }

    /// Text of the first candidate, without thought parts.
    ///
    /// `None` if the candidate has no text at all.
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self
            .content()?
            .parts
            .iter()
            .filter_map(|part| match part.kind() {
                PartKind::Text(text) => Some(text),
                _ => None,
            })
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }

    /// Function calls of the first candidate.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.content()
            .map(|content| content.function_calls().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unmodelled_part_fields_are_replayed() {
        let raw = json!({
            "role": "model",
            "parts": [
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}},
                {"text": "done", "thoughtSignature": "c2ln"}
            ]
        });

        let content: Content = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(content.parts[0].kind(), PartKind::Other);
        assert_eq!(content.parts[0].extra["inlineData"]["mimeType"], "image/png");
        assert!(content.parts[1].extra.is_empty());
        assert_eq!(content.parts[1].kind(), PartKind::Text("done"));

        assert_eq!(serde_json::to_value(&content).unwrap(), raw);
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
            system_instruction: Some(Content::system("be brief")),
            tools: vec![Tool {
                function_declarations: vec![FunctionDeclaration {
                    name: "search_contacts".into(),
                    description: "Find a contact".into(),
                    parameters_json_schema: Some(json!({"type": "object"})),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(0.1),
                max_output_tokens: None,
                thinking_config: Some(ThinkingConfig::DYNAMIC),
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(
            value["tools"][0]["functionDeclarations"][0]["parametersJsonSchema"]["type"],
            "object"
        );
        assert_eq!(
            value["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            -1
        );
        assert!(value["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn response_text_skips_thoughts_and_calls() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "Hello "},
                        {"functionCall": {"name": "noop"}},
                        {"text": "there"}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("Hello there"));
        assert_eq!(response.function_calls().len(), 1);
        assert!(response.automatic_function_calling_history.is_none());
    }

    #[test]
    fn response_without_text_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"functionCall": {"name": "noop"}}]}
            }]
        }))
        .unwrap();
        assert_eq!(response.text(), None);

        let empty = GenerateContentResponse::default();
        assert_eq!(empty.text(), None);
        assert!(empty.function_calls().is_empty());
    }

    #[test]
    fn unknown_roles_and_part_fields_are_tolerated() {
        let content: Content = serde_json::from_value(json!({
            "role": "function",
            "parts": [{"inlineData": {"mimeType": "image/png", "data": ""}}]
        }))
        .unwrap();
        assert_eq!(content.role, Some(Role::Other));
        assert_eq!(content.parts[0].kind(), PartKind::Other);
    }

    #[test]
    fn thought_signature_round_trips() {
        let part: Part = serde_json::from_value(json!({
            "functionCall": {"name": "list_events", "args": {"day": "today"}},
            "thoughtSignature": "abc"
        }))
        .unwrap();
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["thoughtSignature"], "abc");
        assert_eq!(value["functionCall"]["args"]["day"], "today");
    }
}
