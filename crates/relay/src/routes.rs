//! HTTP handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use gemini::Backend;
use runtime::{Conversation, QueryResponse, ToolService};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{Instrument, info, info_span};
use transcript::Message;
use uuid::Uuid;

use crate::Result;

pub(crate) type Shared<B, T> = Arc<Conversation<B, T>>;

#[derive(Debug, Deserialize)]
pub(crate) struct QueryParams {
    q: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackParams {
    code: String,
    state: String,
}

pub(crate) async fn messages<B: Backend, T: ToolService>(
    State(conversation): State<Shared<B, T>>,
) -> Json<Value> {
    let messages: Vec<Message> = conversation.messages().await;
    Json(json!({ "messages": messages }))
}

pub(crate) async fn query<B: Backend, T: ToolService>(
    State(conversation): State<Shared<B, T>>,
    Query(params): Query<QueryParams>,
) -> Result<Json<QueryResponse>> {
    let span = info_span!("query", request_id = %Uuid::new_v4());
    async move {
        info!(chars = params.q.len(), "query received");
        let response = conversation.process_query(&params.q).await?;
        Ok(Json(response))
    }
    .instrument(span)
    .await
}

pub(crate) async fn ping<B: Backend, T: ToolService>(
    State(conversation): State<Shared<B, T>>,
) -> Result<Json<Value>> {
    conversation.ping().await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Server login confirmed.",
    })))
}

pub(crate) async fn reset<B: Backend, T: ToolService>(
    State(conversation): State<Shared<B, T>>,
) -> Json<Value> {
    conversation.reset().await;
    Json(json!({ "status": "success", "message": "Messages cleared" }))
}

pub(crate) async fn oauth_callback<B: Backend, T: ToolService>(
    State(conversation): State<Shared<B, T>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<Value>> {
    conversation
        .complete_sign_on(&params.code, &params.state)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Sign-in complete. You can close this window.",
    })))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "llm-api",
        "message": "Server is running",
    }))
}

pub(crate) async fn health_head() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
