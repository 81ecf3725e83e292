//! Gemini API client with automatic function calling.

use std::future::Future;

use serde_json::json;
use tracing::{debug, warn};

use crate::{
    Error, FunctionCall, FunctionResponse, GenerateContentRequest, GenerateContentResponse, Part,
    Result, Role, Tool, ToolProvider,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Default cap on automatic tool-calling rounds per generation.
pub const DEFAULT_MAX_REMOTE_CALLS: usize = 10;

/// A hosted model that can generate content while calling tools.
pub trait Backend: Send + Sync {
    /// Generate a response, executing any function calls through `tools`.
    ///
    /// Tool round-trips happen inside this call; callers only see them through
    /// [`GenerateContentResponse::automatic_function_calling_history`].
    fn generate_content<T: ToolProvider>(
        &self,
        request: GenerateContentRequest,
        tools: &T,
    ) -> impl Future<Output = Result<GenerateContentResponse>> + Send;
}

/// Builder for [`Client`].
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: String,
    model: String,
    base_url: String,
    max_remote_calls: usize,
}

impl ClientBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_remote_calls: DEFAULT_MAX_REMOTE_CALLS,
        }
    }

    /// Override the API root (e.g. a local mock).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Maximum number of tool-calling rounds before the last response is
    /// returned as is.
    pub fn max_remote_calls(mut self, max_remote_calls: usize) -> Self {
        self.max_remote_calls = max_remote_calls;
        self
    }

    pub fn build(self) -> Client {
        Client {
            http: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            base_url: self.base_url,
            max_remote_calls: self.max_remote_calls,
        }
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_remote_calls", &self.max_remote_calls)
            .finish()
    }
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_remote_calls: usize,
}

impl Client {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One `generateContent` round-trip, no tool execution.
    pub async fn send(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, contents = request.contents.len(), "Gemini API request");

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("HTTP {status}: {body}")));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        if response.candidates.is_empty() {
            let reason = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("unspecified");
            return Err(Error::InvalidResponse(format!(
                "no candidates in response (block reason: {reason})"
            )));
        }

        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                thought_tokens = usage.thoughts_token_count,
                "Gemini API usage"
            );
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_remote_calls", &self.max_remote_calls)
            .finish()
    }
}

impl std::fmt::Display for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gemini({})", self.model)
    }
}

impl Backend for Client {
    async fn generate_content<T: ToolProvider>(
        &self,
        mut request: GenerateContentRequest,
        tools: &T,
    ) -> Result<GenerateContentResponse> {
        let declarations = tools.declarations();
        if !declarations.is_empty() {
            request.tools.push(Tool {
                function_declarations: declarations.to_vec(),
            });
        }

        let mut rounds = 0;
        loop {
            let response = self.send(&request).await?;

            let Some(model_content) = response
                .content()
                .filter(|content| content.function_calls().next().is_some())
                .cloned()
            else {
                return Ok(with_history(response, rounds, request.contents));
            };

            if declarations.is_empty() {
                warn!("model called a function but no tools are attached");
                return Ok(with_history(response, rounds, request.contents));
            }
            if rounds >= self.max_remote_calls {
                warn!(
                    max_remote_calls = self.max_remote_calls,
                    "automatic function calling limit reached"
                );
                return Ok(with_history(response, rounds, request.contents));
            }
            rounds += 1;

            let mut responses = Vec::new();
            for call in model_content.function_calls() {
                responses.push(Part::function_response(execute(tools, call).await));
            }

            request.contents.push(crate::Content {
                role: Some(Role::Model),
                ..model_content
            });
            request.contents.push(crate::Content {
                role: Some(Role::User),
                parts: responses,
            });
        }
    }
}

async fn execute<T: ToolProvider>(tools: &T, call: &FunctionCall) -> FunctionResponse {
    debug!(tool = %call.name, "calling tool");
    let response = match tools.call(call).await {
        Ok(output) => json!({ "result": output }),
        Err(e) => {
            warn!(tool = %call.name, error = %e, "tool call failed");
            json!({ "error": e.to_string() })
        }
    };
    FunctionResponse {
        id: call.id.clone(),
        name: call.name.clone(),
        response,
    }
}

fn with_history(
    mut response: GenerateContentResponse,
    rounds: usize,
    contents: Vec<crate::Content>,
) -> GenerateContentResponse {
    if rounds > 0 {
        response.automatic_function_calling_history = Some(contents);
    }
    response
}
