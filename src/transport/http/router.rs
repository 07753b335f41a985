use crate::domain::Certificate;
use crate::transport::http::handlers::{certificates, health};
use crate::transport::http::types::{
    ApiResponse, AppState, CertificateListResponse, CertificateResponse,
    CreateCertificateRequest, HealthResponse,
};
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;
use tower_http::services::ServeDir;
use utoipa::OpenApi;

/// Mount points of the certificate routes. `/api/...` is what the portfolio front-end calls.
pub const CERTIFICATE_PREFIXES: &[&str] = &["/certificates", "/api/certificates"];

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        certificates::create_certificate_handler,
        certificates::list_certificates_handler,
        certificates::delete_certificate_handler
    ),
    components(schemas(
        Certificate,
        CreateCertificateRequest,
        ApiResponse,
        CertificateResponse,
        CertificateListResponse,
        HealthResponse
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    let mut router = Router::new().route("/health", get(health::healthcheck_handler));

    for &prefix in CERTIFICATE_PREFIXES {
        router = router
            .route(
                prefix,
                get(certificates::list_certificates_handler)
                    .post(certificates::create_certificate_handler),
            )
            .route(
                &format!("{}/:id", prefix),
                delete(certificates::delete_certificate_handler),
            );
    }

    router
        .nest_service("/images", ServeDir::new(&app_state.images_dir))
        .layer(DefaultBodyLimit::max(app_state.max_body_bytes))
        .with_state(app_state)
}
