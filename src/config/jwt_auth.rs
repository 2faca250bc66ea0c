use crate::error::ApiError;
use crate::models::token_claims::TokenPayload;
use crate::util::token::TokenIssuer;
use actix_web::{http, HttpRequest};
use log::debug;

const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub const ADMIN_ROLE: &str = "admin";

/// The only role anyone may grant themselves.
pub const SELF_SERVICE_ROLE: &str = "user";

/// Access token from the `access_token` cookie or an `Authorization: Bearer` header.
pub fn access_token(req: &HttpRequest) -> Option<String> {
    req.cookie(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            req.headers()
                .get(http::header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
        })
}

pub fn authenticate(issuer: &TokenIssuer, token: Option<&str>) -> Result<TokenPayload, ApiError> {
    let token = token.ok_or_else(|| {
        ApiError::Unauthorized("You are not logged in, please provide token".to_string())
    })?;

    issuer.verify_access(token).map_err(|e| {
        debug!("Rejected access token: {}", e);
        ApiError::from(e)
    })
}

pub fn require_role(identity: Option<&TokenPayload>, role: &str) -> Result<(), ApiError> {
    let identity = identity.ok_or_else(|| {
        ApiError::Unauthorized("You are not logged in, please provide token".to_string())
    })?;

    match identity.role.as_deref() {
        Some(granted) if granted == role => Ok(()),
        _ => Err(ApiError::Forbidden(format!(
            "This action requires the {role} role"
        ))),
    }
}
