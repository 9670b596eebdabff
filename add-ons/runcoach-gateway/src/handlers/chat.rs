//! Chat handler: one user message in, one [`ChatReply`] out.
//!
//! Error bodies keep the reply shape (`text` + `id`) with a Korean
//! user-facing message, so clients render them like any coach turn. The
//! orchestrator itself never fails; a 500 here only comes from a panic
//! caught by the gateway's panic layer.

use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const DEFAULT_SESSION: &str = "default";

const ERR_BAD_MESSAGE: &str = "메시지가 올바르지 않습니다.";
const ERR_NO_API_KEY: &str = "API 키가 필요합니다. 앱 설정을 확인해주세요.";
const ERR_SERVER: &str = "서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

fn error_body(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "text": message,
        "id": chrono::Utc::now().timestamp_millis().to_string(),
    });
    (status, Json(body)).into_response()
}

/// Body for panics that escape a handler, via the gateway's CatchPanicLayer.
pub fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    error_body(StatusCode::INTERNAL_SERVER_ERROR, ERR_SERVER)
}

pub async fn handle(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    if req.message.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, ERR_BAD_MESSAGE);
    }
    let Some(orchestrator) = state.orchestrator.as_ref() else {
        return error_body(StatusCode::BAD_REQUEST, ERR_NO_API_KEY);
    };

    let session_id = req.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
    info!(session_id, chars = req.message.len(), "chat request");

    let reply = orchestrator.respond(session_id, &req.message).await;
    Json(reply).into_response()
}
