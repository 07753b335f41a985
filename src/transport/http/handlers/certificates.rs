use crate::transport::http::handlers::common::{parse_id, store_error_response, NOT_FOUND_MESSAGE};
use crate::transport::http::types::{
    parse_create_body, ApiResponse, AppState, CertificateListResponse, CertificateResponse,
    CreateCertificateRequest,
};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/certificates",
    request_body = CreateCertificateRequest,
    responses(
        (status = 201, description = "Certificate added", body = CertificateResponse),
        (status = 400, description = "Missing required fields or undecodable image", body = ApiResponse),
        (status = 422, description = "Body is not valid JSON", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn create_certificate_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> impl IntoResponse {
    let request = match parse_create_body(&headers, body) {
        Ok(r) => r,
        Err(resp) => return resp.into_response(),
    };

    let service = state.certificates.lock().await;
    match service.create(request.into()).await {
        Ok(certificate) => (
            StatusCode::CREATED,
            Json(CertificateResponse {
                success: true,
                message: "Certificate added successfully".to_string(),
                certificate,
            }),
        )
            .into_response(),
        Err(e) => store_error_response(e, "Error adding certificate"),
    }
}

#[utoipa::path(
    get,
    path = "/certificates",
    responses(
        (status = 200, description = "All certificates, newest first", body = CertificateListResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn list_certificates_handler(State(state): State<AppState>) -> impl IntoResponse {
    let service = state.certificates.lock().await;
    match service.list().await {
        Ok(certificates) => (
            StatusCode::OK,
            Json(CertificateListResponse {
                success: true,
                certificates,
            }),
        )
            .into_response(),
        Err(e) => store_error_response(e, "Error fetching certificates"),
    }
}

#[utoipa::path(
    delete,
    path = "/certificates/{id}",
    params(("id" = i64, Path, description = "Certificate id")),
    responses(
        (status = 200, description = "Certificate deleted", body = ApiResponse),
        (status = 404, description = "No certificate with this id", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn delete_certificate_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> impl IntoResponse {
    let Some(id) = parse_id(&raw_id) else {
        return (StatusCode::NOT_FOUND, Json(ApiResponse::fail(NOT_FOUND_MESSAGE))).into_response();
    };

    let service = state.certificates.lock().await;
    match service.delete(id).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Certificate deleted successfully")),
        )
            .into_response(),
        Err(e) => store_error_response(e, "Error deleting certificate"),
    }
}
