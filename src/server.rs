//! HTTP surface.
//!
//! Routes:
//! - `POST /tools/{name}`: invoke a tool, JSON body [`ToolCall`]
//! - `GET /openapi.json`: generated API document
//! - `GET /health`: liveness probe

use crate::dispatch::{Gateway, ToolCall};
use crate::error::DispatchError;
use crate::schema;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct AppState {
    gateway: Arc<Gateway>,
    public_url: Option<String>,
}

/// Build the router.
///
/// `public_url` is advertised in the API document; when `None` it is derived
/// from each request's `Host` header.
pub fn router(gateway: Arc<Gateway>, public_url: Option<String>) -> Router {
    let state = AppState {
        gateway,
        public_url,
    };

    Router::new()
        .route("/tools/{name}", post(invoke_tool))
        .route("/openapi.json", get(openapi_document))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    gateway: Arc<Gateway>,
    public_url: Option<String>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(addr = %addr, tools = gateway.tools().len(), "gateway listening");
    }

    axum::serve(listener, router(gateway, public_url))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn invoke_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, DispatchError> {
    // Parse fully before anything runs
    let call = ToolCall::from_json(&body)?;
    tracing::info!(tool = %name, root = ?call.root, "tool invocation");

    let response = state.gateway.invoke(&name, call).await?;
    Ok(Json(response).into_response())
}

async fn openapi_document(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let server_url = state.public_url.clone().unwrap_or_else(|| {
        headers
            .get(header::HOST)
            .and_then(|host| host.to_str().ok())
            .map(|host| format!("http://{host}"))
            .unwrap_or_else(|| "/".to_string())
    });

    Json(schema::openapi(&state.gateway, &server_url)).into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self {
            DispatchError::Denied(denial) => {
                tracing::debug!(
                    kind = %denial.kind(),
                    status = status.as_u16(),
                    "tool call denied"
                );
                json!({ "error": denial.reason(), "root": denial.attempted_root() })
            }
            DispatchError::UnknownTool { name } => {
                tracing::warn!(tool = %name, "unknown tool");
                json!({ "error": self.to_string(), "tool": name })
            }
            DispatchError::MalformedCall { reason } => {
                tracing::warn!(%reason, "malformed tool call");
                json!({ "error": self.to_string() })
            }
        };

        (status, Json(body)).into_response()
    }
}
