use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_path_from_serde_msg(msg: &str) -> Option<String> {
    for key in [
        "question",
        "course_id",
        "content_type",
        "texts",
        "text",
        "items",
        "metadata",
        "filters",
    ] {
        if msg.contains(key) {
            return Some(key.to_string());
        }
    }
    None
}

fn ensure_request_id(parts: &mut axum::http::response::Parts) -> String {
    if let Some(v) = parts
        .headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        return v.to_string();
    }
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1000);
    let id = format!("req-{nanos}");
    if let Ok(h) = HeaderValue::from_str(&id) {
        parts.headers.insert("X-Request-Id", h);
    }
    id
}

/// Rewrites plain-text 400/422 rejections into the JSON envelope.
///
/// Responses that already carry the envelope (`application/json`) pass through.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if !(status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY) {
        return res;
    }
    let is_json = res
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    let _req_id = ensure_request_id(&mut parts);

    let hint = if original.contains("missing field") {
        Some("A required field is missing from the JSON body.")
    } else if original.contains("expected a sequence") {
        Some("Expected an array for this field, e.g. [\"one\", \"two\"].")
    } else if original.contains("expected a map") || original.contains("expected struct") {
        Some("Expected a JSON object here, e.g. { \"field\": \"value\" }.")
    } else {
        None
    };
    let detail = ApiErrorDetail::new(guess_path_from_serde_msg(&original), hint);

    let envelope = ApiResponse::<()>::error(
        if status == StatusCode::BAD_REQUEST {
            "BAD_REQUEST"
        } else {
            "UNPROCESSABLE_ENTITY"
        },
        original.trim(),
        vec![detail],
    );

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };

    parts.headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}
