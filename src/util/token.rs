use crate::config::config::{ConfigError, TokenConfig};
use crate::models::token_claims::{TokenClaims, TokenKind, TokenPair, TokenPayload};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    Malformed,
    BadSignature,
    Expired,
    NotYetValid,
    WrongKind,
    SessionTooOld,
}

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            InvalidToken::Malformed => "token is malformed",
            InvalidToken::BadSignature => "token signature does not match",
            InvalidToken::Expired => "token has expired",
            InvalidToken::NotYetValid => "token is not valid yet",
            InvalidToken::WrongKind => "token is of the wrong type",
            InvalidToken::SessionTooOld => "session has exceeded its maximum age",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Invalid(InvalidToken),
    #[error("error generating the token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("token expiry does not fit the clock")]
    ExpiryOverflow,
}

/// Issues and verifies HS256 access/refresh token pairs.
///
/// Access and refresh tokens are signed with distinct secrets, so a token of
/// one kind never verifies as the other. Verification depends only on the
/// token string, the keys and the clock.
#[derive(Clone)]
pub struct TokenIssuer {
    access: SigningKeys,
    refresh: SigningKeys,
    session_max_age: Option<i64>,
}

#[derive(Clone)]
struct SigningKeys {
    kind: TokenKind,
    encoding: EncodingKey,
    decoding: DecodingKey,
    max_age: i64,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> std::result::Result<Self, ConfigError> {
        config.check()?;
        Ok(TokenIssuer {
            access: SigningKeys::new(
                TokenKind::Access,
                &config.access_token_secret,
                config.access_token_max_age,
            ),
            refresh: SigningKeys::new(
                TokenKind::Refresh,
                &config.refresh_token_secret,
                config.refresh_token_max_age,
            ),
            session_max_age: config.session_max_age,
        })
    }

    pub fn issue(&self, payload: &TokenPayload) -> Result<TokenPair> {
        self.issue_at(payload, now())
    }

    pub fn issue_at(&self, payload: &TokenPayload, now: i64) -> Result<TokenPair> {
        self.sign_pair(payload, now, now)
    }

    pub fn verify_access(&self, token: &str) -> Result<TokenPayload> {
        self.verify_access_at(token, now())
    }

    pub fn verify_access_at(&self, token: &str, now: i64) -> Result<TokenPayload> {
        self.access.verify(token, now).map(TokenPayload::from)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<TokenPayload> {
        self.verify_refresh_at(token, now())
    }

    pub fn verify_refresh_at(&self, token: &str, now: i64) -> Result<TokenPayload> {
        self.refresh.verify(token, now).map(TokenPayload::from)
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        self.refresh_at(refresh_token, now())
    }

    /// Verifies a refresh token and signs a brand-new pair for the same
    /// identity. The session start (`auth_time`) carries over.
    pub fn refresh_at(&self, refresh_token: &str, now: i64) -> Result<TokenPair> {
        let claims = self.refresh.verify(refresh_token, now)?;
        if let Some(max_age) = self.session_max_age {
            if now - claims.auth_time > max_age {
                return Err(TokenError::Invalid(InvalidToken::SessionTooOld));
            }
        }
        let auth_time = claims.auth_time;
        self.sign_pair(&TokenPayload::from(claims), auth_time, now)
    }

    fn sign_pair(&self, payload: &TokenPayload, auth_time: i64, now: i64) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.access.sign(payload, auth_time, now)?,
            refresh_token: self.refresh.sign(payload, auth_time, now)?,
        })
    }
}

impl SigningKeys {
    fn new(kind: TokenKind, secret: &str, max_age: i64) -> Self {
        SigningKeys {
            kind,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            max_age,
        }
    }

    fn sign(&self, payload: &TokenPayload, auth_time: i64, now: i64) -> Result<String> {
        let claims = TokenClaims {
            sub: payload.user_id.to_owned(),
            email: payload.email.to_owned(),
            role: payload.role.to_owned(),
            token_uuid: Uuid::new_v4().to_string(),
            typ: self.kind,
            iat: now,
            nbf: now,
            exp: now
                .checked_add(self.max_age)
                .ok_or(TokenError::ExpiryOverflow)?,
            auth_time,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    fn verify(&self, token: &str, now: i64) -> Result<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp and nbf are checked against the caller's clock below.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                TokenError::Invalid(match e.kind() {
                    ErrorKind::InvalidSignature => InvalidToken::BadSignature,
                    _ => InvalidToken::Malformed,
                })
            })?
            .claims;

        if claims.typ != self.kind {
            return Err(TokenError::Invalid(InvalidToken::WrongKind));
        }
        if claims.exp <= now {
            return Err(TokenError::Invalid(InvalidToken::Expired));
        }
        if claims.nbf > now {
            return Err(TokenError::Invalid(InvalidToken::NotYetValid));
        }
        Ok(claims)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
