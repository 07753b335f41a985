// src/bin/api_server.rs

use certificate_store::transport;
use certificate_store::{CertificateService, ServerConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("certificate_store=info,api_server=info,tower_http=info")
        }))
        .init();

    // --- Service Initialization ---
    info!(
        certificates_file = %config.store.certificates_file.display(),
        images_dir = %config.store.images_dir.display(),
        "Initializing CertificateService"
    );
    let service = CertificateService::open(&config.store).await?;
    match service.count().await {
        Ok(n) => info!(certificates = n, "CertificateService initialized"),
        Err(e) => warn!(error = %e, "Records file is not readable; requests will fail until it is fixed"),
    }

    let app_state = transport::http::AppState::new(service, config.max_body_bytes);

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "API server listening");
    info!("Swagger UI available at /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received (Ctrl+C)");
        })
        .await?;

    info!("Graceful shutdown complete");
    Ok(())
}
