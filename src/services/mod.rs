pub mod auth_service;
pub mod record_service;
