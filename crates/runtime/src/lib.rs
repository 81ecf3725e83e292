//! Relay runtime: one shared conversation between users, a hosted model, and
//! remote MCP tools.
//!
//! # Overview
//!
//! - **Conversation**: owns the transcript and runs each query through the
//!   model with a fresh tool session attached.
//! - **ToolService**: opens per-request tool sessions. Implemented for
//!   [`mcp::McpClient`].
//! - **extract_function_calls**: reads the tool calls the model made out of a
//!   response.
//!
//! # Example
//!
//! ```ignore
//! use gemini::Client;
//! use mcp::{McpAuth, McpClient};
//! use runtime::Conversation;
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = Client::builder("api-key", gemini::DEFAULT_MODEL).build();
//! let tools = McpClient::new("https://tools.example.com/mcp", McpAuth::None);
//!
//! let conversation = Conversation::new(backend, tools);
//! let reply = conversation.process_query("What's on my calendar today?").await?;
//! println!("{}", reply.response_text);
//! # Ok(())
//! # }
//! ```

mod conversation;
mod error;
mod extract;
mod prompt;
mod tools;

pub use conversation::{Conversation, QueryResponse};
pub use error::{Error, Result};
pub use extract::extract_function_calls;
pub use prompt::system_instruction;
pub use tools::{RemoteTools, ToolService, ToolSession};
