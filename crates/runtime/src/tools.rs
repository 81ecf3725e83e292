//! Tool sessions backed by a remote MCP server.

use std::future::Future;

use gemini::{FunctionCall, FunctionDeclaration, ToolError, ToolProvider};
use mcp::{CallToolResult, McpClient, McpSession, Tool};
use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

/// An open session whose tools the model may call.
pub trait ToolSession: ToolProvider {
    /// Liveness check.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Release the session.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Source of per-request tool sessions.
pub trait ToolService: Send + Sync {
    type Session: ToolSession;

    /// Open a session, signing in first if needed.
    fn open(&self) -> impl Future<Output = Result<Self::Session>> + Send;

    /// Finish an interactive sign-on with the redirect parameters.
    fn complete_sign_on(
        &self,
        _code: &str,
        _state: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        std::future::ready(Err(Error::SignOn(
            "tool service does not use interactive sign-on".to_string(),
        )))
    }
}

/// An MCP session exposed to the model.
pub struct RemoteTools {
    session: McpSession,
    declarations: Vec<FunctionDeclaration>,
}

impl RemoteTools {
    /// Wrap `session`, advertising the tools the server lists now.
    pub async fn new(session: McpSession) -> Result<Self> {
        let tools = match session.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                session.close().await;
                return Err(Error::RemoteToolUnavailable(e.to_string()));
            }
        };
        debug!(count = tools.len(), "remote tools listed");

        Ok(Self {
            session,
            declarations: tools.iter().map(declaration).collect(),
        })
    }
}

fn declaration(tool: &Tool) -> FunctionDeclaration {
    FunctionDeclaration {
        name: tool.name.to_string(),
        description: tool
            .description
            .as_deref()
            .map(str::to_string)
            .unwrap_or_default(),
        parameters_json_schema: Some(Value::Object((*tool.input_schema).clone())),
    }
}

fn output(result: CallToolResult) -> std::result::Result<Value, ToolError> {
    if result.is_error.unwrap_or(false) {
        let message: Vec<&str> = result
            .content
            .iter()
            .filter_map(|c| c.as_text())
            .map(|t| t.text.as_str())
            .collect();
        return Err(ToolError::Execution(message.join("\n")));
    }

    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }
    serde_json::to_value(&result.content)
        .map_err(|e| ToolError::Execution(format!("serialize result: {e}")))
}

impl ToolProvider for RemoteTools {
    fn declarations(&self) -> &[FunctionDeclaration] {
        &self.declarations
    }

    async fn call(&self, call: &FunctionCall) -> std::result::Result<Value, ToolError> {
        if !self.declarations.iter().any(|d| d.name == call.name) {
            return Err(ToolError::NotFound(call.name.clone()));
        }

        let result = self
            .session
            .call_tool(call.name.clone(), call.args.clone())
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        output(result)
    }
}

impl ToolSession for RemoteTools {
    async fn ping(&self) -> Result<()> {
        self.session
            .ping()
            .await
            .map_err(|e| Error::RemoteToolUnavailable(e.to_string()))
    }

    async fn close(self) {
        self.session.close().await;
    }
}

impl ToolService for McpClient {
    type Session = RemoteTools;

    async fn open(&self) -> Result<RemoteTools> {
        let session = self
            .connect()
            .await
            .map_err(|e| Error::RemoteToolUnavailable(e.to_string()))?;
        RemoteTools::new(session).await
    }

    async fn complete_sign_on(&self, code: &str, state: &str) -> Result<()> {
        McpClient::complete_sign_on(self, code, state)
            .await
            .map_err(|e| Error::SignOn(e.to_string()))
    }
}
