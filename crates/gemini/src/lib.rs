//! Google Gemini client with automatic function calling.
//!
//! [`Client`] sends `generateContent` requests. When a [`ToolProvider`] is
//! attached, the model may call its functions: the client executes each call,
//! feeds the results back, and repeats until the model produces a final
//! answer. The exchanged contents are recorded on the final response as
//! [`GenerateContentResponse::automatic_function_calling_history`].
//!
//! # Example
//!
//! ```ignore
//! use gemini::{Backend, Client, Content, GenerateContentRequest, NoTools};
//!
//! # async fn example() -> gemini::Result<()> {
//! let client = Client::builder(std::env::var("GEMINI_API_KEY").unwrap(), "gemini-2.5-pro").build();
//! let request = GenerateContentRequest {
//!     contents: vec![Content::user("Hello!")],
//!     ..Default::default()
//! };
//! let response = client.generate_content(request, &NoTools).await?;
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod tools;
mod types;

pub use client::{
    Backend, Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_MAX_REMOTE_CALLS, DEFAULT_MODEL,
};
pub use error::{Error, Result};
pub use tools::{NoTools, ToolError, ToolProvider};
pub use types::{
    Candidate, Content, FunctionCall, FunctionDeclaration, FunctionResponse,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, PartKind,
    PromptFeedback, Role, ThinkingConfig, Tool, UsageMetadata,
};
