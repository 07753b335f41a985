pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::certificate_service::CertificateService;
pub use app::error::{StoreError, StoreResult};
pub use domain::{Certificate, CertificateDraft};
pub use infra::config::{ServerConfig, StoreConfig};
