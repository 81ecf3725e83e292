//! MCP (Model Context Protocol) client for remote tool servers.
//!
//! This crate connects to an MCP server over Streamable HTTP using the
//! official rmcp SDK, with optional bearer or interactive OAuth
//! authentication.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{McpAuth, McpClient};
//!
//! # async fn example() -> mcp::Result<()> {
//! let client = McpClient::new("https://tools.example.com/mcp", McpAuth::None);
//!
//! let session = client.connect().await?;
//! session.ping().await?;
//!
//! for tool in session.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! let result = session
//!     .call_tool("search_contacts", Some(serde_json::json!({"query": "Alice"})
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default()))
//!     .await?;
//! println!("{:?}", result.content);
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod sign_on;

pub use client::{McpAuth, McpClient, McpSession};
pub use error::{Error, Result};
pub use rmcp::model::{CallToolResult, Content, Tool};
pub use sign_on::OAuthSettings;
