//! Calendar export handler: plan card fields in, downloadable .ics out.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use runcoach_core::calendar;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const ERR_MISSING_FIELDS: &str = "필수 정보가 누락되었습니다.";
const ERR_BUILD_FAILED: &str = "일정 파일 생성 중 오류가 발생했습니다.";

#[derive(Deserialize)]
pub struct IcalRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub details: String,
}

pub async fn handle(Json(req): Json<IcalRequest>) -> Response {
    let fields = [&req.title, &req.date, &req.duration, &req.details];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": ERR_MISSING_FIELDS })),
        )
            .into_response();
    }

    info!(title = %req.title, "ical export");
    let ics = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        calendar::build_ics(&req.title, &req.date, &req.duration, &req.details)
    })) {
        Ok(ics) => ics,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": ERR_BUILD_FAILED })),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"running_plan.ics\"",
            ),
        ],
        ics,
    )
        .into_response()
}
