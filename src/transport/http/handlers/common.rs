use crate::app::error::StoreError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

pub const NOT_FOUND_MESSAGE: &str = "Certificate not found";

/// Maps a service error onto the JSON envelope. `context` names the failed operation and is
/// only used for internal errors (e.g. "Error adding certificate").
pub fn store_error_response(err: StoreError, context: &str) -> Response {
    match err {
        StoreError::Validation(message) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::fail(message))).into_response()
        }
        StoreError::NotFound(_) => {
            (StatusCode::NOT_FOUND, Json(ApiResponse::fail(NOT_FOUND_MESSAGE))).into_response()
        }
        StoreError::Internal(e) => {
            let detail = format!("{:#}", e);
            error!(error = %detail, "{}", context);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::fail_with(context, detail)),
            )
                .into_response()
        }
    }
}

/// Path ids are integers; anything else cannot name a certificate.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers_only() {
        assert_eq!(parse_id("12"), Some(12));
        assert_eq!(parse_id(" -3 "), Some(-3));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), None);
        assert_eq!(parse_id("5abc"), None);
    }

    #[test]
    fn maps_error_kinds_to_status_codes() {
        let r = store_error_response(StoreError::Validation("Missing required fields: title".into()), "x");
        assert_eq!(r.status(), StatusCode::BAD_REQUEST);

        let r = store_error_response(StoreError::NotFound(9), "x");
        assert_eq!(r.status(), StatusCode::NOT_FOUND);

        let r = store_error_response(StoreError::Internal(anyhow::anyhow!("boom")), "x");
        assert_eq!(r.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
