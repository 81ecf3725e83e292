//! MCP client over Streamable HTTP.

use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, ClientRequest, RequestNoParam, Tool},
    service::{RoleClient, RunningService},
    transport::{
        StreamableHttpClientTransport, auth::AuthorizationManager,
        streamable_http_client::StreamableHttpClientTransportConfig,
    },
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::sign_on::{self, OAuthSettings, PendingCallback};
use crate::{Error, Result};

/// How sessions authenticate to the MCP server.
#[derive(Clone, PartialEq, Eq)]
pub enum McpAuth {
    /// No credentials.
    None,
    /// A static bearer token.
    Bearer(String),
    /// Interactive OAuth sign-on on first use.
    OAuth(OAuthSettings),
}

impl std::fmt::Debug for McpAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bearer(_) => write!(f, "Bearer([REDACTED])"),
            Self::OAuth(settings) => f.debug_tuple("OAuth").field(settings).finish(),
        }
    }
}

impl std::fmt::Display for McpAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Bearer(_) => write!(f, "bearer"),
            Self::OAuth(_) => write!(f, "oauth"),
        }
    }
}

/// Long-lived handle to a remote MCP server.
///
/// Holds the server address and credentials; each [`connect`](Self::connect)
/// opens a fresh [`McpSession`].
pub struct McpClient {
    url: String,
    auth: McpAuth,
    authorization: Mutex<Option<AuthorizationManager>>,
    pending: PendingCallback,
}

impl McpClient {
    pub fn new(url: impl Into<String>, auth: McpAuth) -> Self {
        Self {
            url: url.into(),
            auth,
            authorization: Mutex::new(None),
            pending: PendingCallback::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn auth(&self) -> &McpAuth {
        &self.auth
    }

    /// Open a session, signing in first if the server needs it.
    ///
    /// If the server turns away a session opened with cached OAuth
    /// credentials, they are dropped and a fresh sign-on is started.
    pub async fn connect(&self) -> Result<McpSession> {
        let reused = self.holds_authorization().await;
        let reason = match self.open().await {
            Err(Error::Connect(reason)) => reason,
            outcome => return outcome,
        };
        if !reused || !self.forget_authorization().await {
            return Err(Error::Connect(reason));
        }

        warn!(error = %reason, "MCP server rejected stored credentials; signing in again");
        self.open().await
    }

    /// Hand the OAuth redirect parameters to the sign-on waiting for them.
    pub async fn complete_sign_on(&self, code: &str, state: &str) -> Result<()> {
        self.pending.deliver(code, state).await
    }

    /// The URL the user must open to finish the sign-on in progress, if any.
    pub async fn authorization_url(&self) -> Option<String> {
        self.pending.authorization_url().await
    }

    async fn open(&self) -> Result<McpSession> {
        let mut config = StreamableHttpClientTransportConfig::with_uri(self.url.clone());
        if let Some(token) = self.access_token().await? {
            config = config.auth_header(token);
        }

        let transport = StreamableHttpClientTransport::from_config(config);
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| Error::Connect(e.to_string()))?;

        debug!(url = %self.url, "MCP session opened");
        Ok(McpSession { service })
    }

    async fn access_token(&self) -> Result<Option<String>> {
        let settings = match &self.auth {
            McpAuth::None => return Ok(None),
            McpAuth::Bearer(token) => return Ok(Some(token.clone())),
            McpAuth::OAuth(settings) => settings,
        };

        // Held across the sign-on so concurrent sessions wait for one flow.
        let mut authorization = self.authorization.lock().await;
        if let Some(manager) = authorization.take() {
            match manager.get_access_token().await {
                Ok(token) => {
                    *authorization = Some(manager);
                    return Ok(Some(token));
                }
                Err(e) => warn!(error = %e, "stored MCP credentials unusable; signing in again"),
            }
        }

        let manager = sign_on::sign_on(&self.url, settings, &self.pending).await?;
        let token = manager
            .get_access_token()
            .await
            .map_err(|e| Error::SignOn(e.to_string()))?;
        *authorization = Some(manager);
        Ok(Some(token))
    }

    async fn holds_authorization(&self) -> bool {
        matches!(self.auth, McpAuth::OAuth(_)) && self.authorization.lock().await.is_some()
    }

    /// Drop cached OAuth credentials, reporting whether there were any.
    async fn forget_authorization(&self) -> bool {
        matches!(self.auth, McpAuth::OAuth(_)) && self.authorization.lock().await.take().is_some()
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("url", &self.url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

/// An open MCP session.
///
/// Call [`close`](Self::close) when done; dropping it also tears the session
/// down, without waiting.
#[derive(Debug)]
pub struct McpSession {
    service: RunningService<RoleClient, ()>,
}

impl McpSession {
    /// Liveness check.
    ///
    /// Any successful reply counts; servers may attach `_meta` to the
    /// otherwise empty result.
    pub async fn ping(&self) -> Result<()> {
        self.service
            .send_request(ClientRequest::PingRequest(RequestNoParam::default()))
            .await
            .map(|_| ())
            .map_err(|e| Error::Ping(e.to_string()))
    }

    /// List available tools from the server.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let response = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(|e| Error::Request(format!("tools/list: {e}")))?;
        Ok(response.tools)
    }

    /// Call a tool with the given name and arguments.
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<CallToolResult> {
        let params = CallToolRequestParams {
            name: name.into().into(),
            arguments,
            meta: None,
            task: None,
        };

        self.service
            .call_tool(params)
            .await
            .map_err(|e| Error::Request(format!("tools/call: {e}")))
    }

    /// Shut the session down.
    pub async fn close(self) {
        if let Err(e) = self.service.cancel().await {
            warn!(error = %e, "MCP session did not shut down cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_is_redacted() {
        let auth = McpAuth::Bearer("top-secret".into());
        assert!(!format!("{auth:?}").contains("top-secret"));
        assert_eq!(auth.to_string(), "bearer");

        let client = McpClient::new("https://tools.example.com/mcp", auth);
        assert!(!format!("{client:?}").contains("top-secret"));
    }

    #[tokio::test]
    async fn static_auth_needs_no_sign_on() {
        let client = McpClient::new("http://localhost:1/mcp", McpAuth::None);
        assert_eq!(client.access_token().await.unwrap(), None);

        let client = McpClient::new("http://localhost:1/mcp", McpAuth::Bearer("t".into()));
        assert_eq!(client.access_token().await.unwrap().as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn callback_without_sign_on_is_rejected() {
        let client = McpClient::new("http://localhost:1/mcp", McpAuth::None);
        let err = client.complete_sign_on("code", "state").await.unwrap_err();
        assert!(matches!(err, Error::NoPendingSignOn));
        assert_eq!(client.authorization_url().await, None);
    }

    #[tokio::test]
    async fn only_oauth_credentials_are_forgotten() {
        let client = McpClient::new("http://localhost:1/mcp", McpAuth::Bearer("t".into()));
        assert!(!client.forget_authorization().await);

        let client = McpClient::new(
            "http://localhost:1/mcp",
            McpAuth::OAuth(OAuthSettings::new("http://localhost:8000/oauth/callback")),
        );
        assert!(!client.holds_authorization().await);
        assert!(!client.forget_authorization().await);

        *client.authorization.lock().await =
            Some(AuthorizationManager::new("http://localhost:1/mcp").await.unwrap());
        assert!(client.holds_authorization().await);
        assert!(client.forget_authorization().await);
        assert!(!client.holds_authorization().await);
    }
}
