use crate::models::response::ErrorResponse;
use crate::repository::RepositoryError;
use crate::util::token::TokenError;
use crate::validation::ValidationError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(reason) => ApiError::Unauthorized(reason.to_string()),
            TokenError::Signing(e) => ApiError::Internal(format!("token signing failed: {e}")),
            TokenError::ExpiryOverflow => ApiError::Internal(TokenError::ExpiryOverflow.to_string()),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(_) => ApiError::Conflict("Resource already exists".into()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(err) => ErrorResponse {
                errors: err.violations.clone(),
                ..ErrorResponse::failed("Validation failed")
            },
            // The cause is logged at the dispatch boundary, never sent.
            ApiError::Internal(_) => ErrorResponse::failed("Something went wrong"),
            other => ErrorResponse::failed(other.to_string()),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
