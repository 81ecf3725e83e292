//! Interactive OAuth sign-on against an MCP server.
//!
//! The flow is driven from the relay: the first session that needs a token
//! starts an authorization, logs the URL the user must open, and waits until
//! the identity provider redirects the browser back to the relay, which hands
//! the redirect parameters over with [`McpClient::complete_sign_on`].
//!
//! [`McpClient::complete_sign_on`]: crate::McpClient::complete_sign_on

use rmcp::transport::auth::{AuthorizationManager, OAuthState};
use tokio::sync::{Mutex, oneshot};
use tracing::{info, warn};

use crate::{Error, Result};

/// OAuth client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    /// Where the identity provider sends the browser after consent.
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Name used for dynamic client registration.
    pub client_name: String,
}

impl OAuthSettings {
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            client_name: "llm-relay".to_string(),
        }
    }

    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug)]
struct Callback {
    code: String,
    state: String,
}

#[derive(Debug)]
struct Waiter {
    authorization_url: String,
    tx: oneshot::Sender<Callback>,
}

/// Slot for the one sign-on that may be waiting on a browser redirect.
#[derive(Debug, Default)]
pub(crate) struct PendingCallback {
    slot: Mutex<Option<Waiter>>,
}

impl PendingCallback {
    async fn register(&self, authorization_url: &str) -> oneshot::Receiver<Callback> {
        let (tx, rx) = oneshot::channel();
        let waiter = Waiter {
            authorization_url: authorization_url.to_string(),
            tx,
        };
        if self.slot.lock().await.replace(waiter).is_some() {
            warn!("replacing an unfinished sign-on");
        }
        rx
    }

    pub(crate) async fn authorization_url(&self) -> Option<String> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|waiter| !waiter.tx.is_closed())
            .map(|waiter| waiter.authorization_url.clone())
    }

    pub(crate) async fn deliver(&self, code: &str, state: &str) -> Result<()> {
        let Waiter { tx, .. } = self
            .slot
            .lock()
            .await
            .take()
            .ok_or(Error::NoPendingSignOn)?;
        tx.send(Callback {
            code: code.to_string(),
            state: state.to_string(),
        })
        .map_err(|_| Error::SignOnAbandoned)
    }
}

/// Run the authorization-code flow and return a manager holding the tokens.
pub(crate) async fn sign_on(
    server_url: &str,
    settings: &OAuthSettings,
    pending: &PendingCallback,
) -> Result<AuthorizationManager> {
    let mut oauth = OAuthState::new(server_url, None)
        .await
        .map_err(|e| Error::SignOn(format!("metadata discovery: {e}")))?;

    let scopes: Vec<&str> = settings.scopes.iter().map(String::as_str).collect();
    oauth
        .start_authorization(&scopes, &settings.redirect_uri, Some(&settings.client_name))
        .await
        .map_err(|e| Error::SignOn(format!("start authorization: {e}")))?;

    let authorization_url = oauth
        .get_authorization_url()
        .await
        .map_err(|e| Error::SignOn(format!("authorization url: {e}")))?;

    let callback = pending.register(&authorization_url).await;
    info!(
        url = %authorization_url,
        "MCP server requires sign-in; open this URL in a browser to continue"
    );

    let Callback { code, state } = callback.await.map_err(|_| Error::SignOnAbandoned)?;

    oauth
        .handle_callback(&code, &state)
        .await
        .map_err(|e| Error::SignOn(format!("token exchange: {e}")))?;

    info!(server = %server_url, "MCP sign-in complete");
    oauth
        .into_authorization_manager()
        .ok_or_else(|| Error::SignOn("authorization did not complete".to_string()))
}
