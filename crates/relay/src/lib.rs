//! HTTP relay between a browser UI, Gemini, and a remote MCP tool server.
//!
//! Endpoints:
//!
//! | Method      | Path              | Purpose                                  |
//! |-------------|-------------------|------------------------------------------|
//! | `GET`       | `/messages`       | Full transcript                          |
//! | `GET`       | `/query?q=`       | Answer a query with tools attached       |
//! | `GET`       | `/ping`           | Check the tool server, signing in if needed |
//! | `POST`      | `/reset`          | Clear the transcript                     |
//! | `GET`       | `/oauth/callback` | Finish an interactive sign-in            |
//! | `GET`/`HEAD`| `/`               | Health check                             |

pub mod config;
mod error;
mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use gemini::Backend;
use mcp::McpClient;
use runtime::{Conversation, ToolService};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::{Config, ConfigError};
pub use error::{Error, Result};

/// Build the relay's router around a shared conversation.
pub fn router<B, T>(conversation: Arc<Conversation<B, T>>) -> Router
where
    B: Backend + 'static,
    T: ToolService + 'static,
{
    // Any origin, echoed back so credentials are allowed.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(routes::health).head(routes::health_head))
        .route("/messages", get(routes::messages::<B, T>))
        .route("/query", get(routes::query::<B, T>))
        .route("/ping", get(routes::ping::<B, T>))
        .route("/reset", post(routes::reset::<B, T>))
        .route("/oauth/callback", get(routes::oauth_callback::<B, T>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(conversation)
}

/// Serve `app` on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

/// Build the clients described by `config` and serve until shut down.
pub async fn run(config: Config) -> Result<()> {
    let mut backend = gemini::Client::builder(&config.api_key, &config.model)
        .max_remote_calls(config.max_remote_calls);
    if let Some(base_url) = &config.gemini_base_url {
        backend = backend.base_url(base_url);
    }
    let backend = backend.build();
    let tools = McpClient::new(&config.mcp_url, config.mcp_auth.clone());

    info!(
        model = %config.model,
        mcp_url = %config.mcp_url,
        mcp_auth = %config.mcp_auth,
        "relay configured"
    );

    let conversation = Arc::new(Conversation::new(backend, tools));
    let app = router(conversation);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "listening");

    serve(listener, app).await
}
