pub mod certificate_service;
pub mod error;
