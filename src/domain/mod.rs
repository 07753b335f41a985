//! Domain types for the certificate gallery.

pub mod certificate;
pub mod data_url;

pub use certificate::{sort_by_date_desc, Certificate, CertificateDraft, NewCertificate};
pub use data_url::DataUrl;
