use axum::{body::Bytes, extract::Extension, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// Run the workflow for `{ "isin": "..." }`.
///
/// 200 with the result, 400 with `{error, code, httpStatus}` for a
/// workflow failure, 400 with `{error}` for a bad body.
pub async fn weights_handler(
    Extension(state): Extension<AppState>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let isin = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.get("isin").and_then(Value::as_str).map(str::to_string))
        .filter(|isin| !isin.is_empty());

    let Some(isin) = isin else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "parameter 'isin' is missing or invalid" })),
        );
    };

    match state.workflow.run(&isin).await {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => {
                tracing::error!(isin = %isin, error = %e, "Failed to serialize result");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
            }
        },
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": err.message,
                "code": err.code,
                "httpStatus": err.http_status,
            })),
        ),
    }
}
