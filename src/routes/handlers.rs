//! Route handlers

use super::AppState;
use crate::Result;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "uptime": 42069 }))
}

/// GET /ready
pub async fn ready() -> Json<Value> {
    Json(json!({ "status": "ready" }))
}

/// GET /paid - canonical priced endpoint
pub async fn paid(State(state): State<AppState>) -> Result<Json<Value>> {
    state.config.require_pay_to()?;
    Ok(Json(json!({ "message": "*****" })))
}

/// GET /gated/{resource} - the origin's protected copy, fetched with Basic auth
pub async fn gated(State(state): State<AppState>, request: Request) -> Result<Response> {
    let credentials = state.config.require_origin_credentials()?;
    let (parts, _body) = request.into_parts();

    let response = state
        .proxy
        .forward_gated(parts.uri.path(), &parts, &credentials)
        .await?;
    Ok(response.into_response())
}

/// Anything no other route claimed
pub async fn catch_all(State(state): State<AppState>, request: Request) -> Result<Response> {
    state.proxy.forward_any(request).await
}
