use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use mongodb::error::{ErrorKind, WriteFailure};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether internal error details are echoed back to clients.
/// Only switched on when the service runs with `APP_ENV=development`.
static EXPOSE_INTERNAL: AtomicBool = AtomicBool::new(false);

pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL.store(enabled, Ordering::Relaxed);
}

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Something went wrong!")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        ApiError::Internal(detail.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) | ApiError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = self.body(EXPOSE_INTERNAL.load(Ordering::Relaxed));
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl ApiError {
    fn body(&self, expose_internal: bool) -> serde_json::Value {
        match self {
            ApiError::Internal(detail) if expose_internal => {
                serde_json::json!({ "message": self.to_string(), "error": detail })
            }
            _ => serde_json::json!({ "message": self.to_string() }),
        }
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return ApiError::Conflict("Account already exists".to_string());
        }
        log::error!("❌ Database error: {}", err);
        ApiError::Internal(format!("Database error: {}", err))
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        log::error!("❌ Password hashing error: {}", err);
        ApiError::Internal(format!("Password hashing error: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        log::debug!("Token rejected: {}", err);
        ApiError::Unauthorized("Token is not valid".to_string())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::Internal(format!("Blocking task failed: {}", err))
    }
}

/// Unique index violations surface as write error 11000.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: ApiError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(ApiError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::internal("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn client_errors_carry_their_message() {
        let body = body_json(ApiError::validation("Topic is required")).await;
        assert_eq!(body["message"], "Topic is required");

        let body = body_json(ApiError::InvalidCredentials).await;
        assert_eq!(body["message"], "Invalid email or password");
    }

    #[test]
    fn development_body_carries_internal_detail() {
        let body = ApiError::internal("connection reset").body(true);
        assert_eq!(body["message"], "Something went wrong!");
        assert_eq!(body["error"], "connection reset");

        // Client errors never grow an `error` field
        let body = ApiError::validation("Topic is required").body(true);
        assert!(body.get("error").is_none());

        let body = ApiError::internal("connection reset").body(false);
        assert!(body.get("error").is_none());
    }

    #[actix_web::test]
    async fn internal_detail_is_hidden_by_default() {
        let body = body_json(ApiError::internal("connection reset")).await;
        assert_eq!(body["message"], "Something went wrong!");
        assert!(body.get("error").is_none());
    }
}
