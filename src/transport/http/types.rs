use crate::app::certificate_service::CertificateService;
use crate::domain::{Certificate, CertificateDraft};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub certificates: Arc<Mutex<CertificateService>>,
    /// Served read-only under `/images`.
    pub images_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(service: CertificateService, max_body_bytes: usize) -> Self {
        let images_dir = service.images().root_dir().to_path_buf();
        Self {
            certificates: Arc::new(Mutex::new(service)),
            images_dir,
            max_body_bytes,
        }
    }
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct CreateCertificateRequest {
    pub title: Option<String>,
    pub issuer: Option<String>,
    /// Issue date, e.g. `2024-01-31`.
    pub date: Option<String>,
    /// Image as a data URL: `data:image/png;base64,...`.
    pub image: Option<String>,
    pub short_description: Option<String>,
}

impl From<CreateCertificateRequest> for CertificateDraft {
    fn from(req: CreateCertificateRequest) -> Self {
        CertificateDraft {
            title: req.title,
            issuer: req.issuer,
            date: req.date,
            image: req.image,
            short_description: req.short_description,
        }
    }
}

/// Generic envelope for messages and failures.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Underlying cause, only on internal failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn fail_with(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error: Some(error.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CertificateResponse {
    pub success: bool,
    pub message: String,
    pub certificate: Certificate,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CertificateListResponse {
    pub success: bool,
    /// Sorted by `date`, newest first.
    pub certificates: Vec<Certificate>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificates: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decodes a create body the way browsers send it.
///
/// A request without a JSON content type, or with an empty body, carries no fields and is
/// handed to validation as an empty request. Only a JSON body that fails to parse is a 422.
pub fn parse_create_body(
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<CreateCertificateRequest, (StatusCode, Json<ApiResponse>)> {
    let body = body.map_err(|e| {
        (
            e.status(),
            Json(ApiResponse::fail_with("Could not read request body", e.body_text())),
        )
    })?;

    if !is_json_content_type(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateCertificateRequest::default());
    }

    serde_json::from_slice(&body).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::fail_with(
                "Invalid JSON body (expected: {title, issuer, date, image, short_description?})",
                e.to_string(),
            )),
        )
    })
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers() -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        h
    }

    #[test]
    fn missing_content_type_yields_empty_request() {
        let req = parse_create_body(&HeaderMap::new(), Ok(Bytes::from_static(b"{\"title\":\"x\"}")))
            .unwrap();
        assert!(req.title.is_none());
    }

    #[test]
    fn empty_json_body_yields_empty_request() {
        let req = parse_create_body(&json_headers(), Ok(Bytes::from_static(b"  \n"))).unwrap();
        assert!(req.title.is_none() && req.image.is_none());
    }

    #[test]
    fn json_body_is_decoded() {
        let req = parse_create_body(
            &json_headers(),
            Ok(Bytes::from_static(b"{\"title\":\"CKA\",\"date\":\"2024-01-01\"}")),
        )
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("CKA"));
        assert_eq!(req.date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn broken_json_is_unprocessable() {
        let (status, _) =
            parse_create_body(&json_headers(), Ok(Bytes::from_static(b"{ not json"))).unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
