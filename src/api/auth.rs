//! # Authentication
//!
//! HS256 JWT issuing and verification, the login handler, and the
//! middleware guarding every non-public route.
//!
//! Tokens are accepted from `Authorization: Bearer <jwt>` or, for browser
//! `EventSource`/`WebSocket` clients that cannot set headers, from a
//! `?token=<jwt>` query parameter.

use crate::api::rest::handlers::AppState;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::infrastructure::config::AuthSettings;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user.
    pub sub: String,
    /// Issued at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    token_ttl_secs: i64,
    username: String,
    password: String,
}

impl fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtAuth")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl JwtAuth {
    /// Creates an issuer from the auth settings.
    #[must_use]
    pub fn new(settings: &AuthSettings) -> Self {
        let secret = settings.jwt_secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            token_ttl_secs: i64::try_from(settings.token_ttl_secs).unwrap_or(i64::MAX),
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }

    /// True if the pair matches the configured login.
    #[must_use]
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }

    /// Issues a token for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Internal` if signing fails.
    pub fn issue(&self, subject: &str) -> ApplicationResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.token_ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApplicationError::internal(format!("failed to sign token: {e}")))
    }

    /// Verifies a token's signature and expiry.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Unauthorized` if the token is malformed,
    /// signed with another key, or expired.
    pub fn verify(&self, token: &str) -> ApplicationResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ApplicationError::unauthorized(format!("invalid token: {e}")))
    }
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
}

/// `POST /auth/login`
///
/// # Errors
///
/// Returns `Validation` for a malformed body and `Unauthorized` for wrong
/// credentials.
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApplicationResult<Json<LoginResponse>> {
    let Json(request) = body.map_err(|e| ApplicationError::validation(e.body_text()))?;
    if !state.auth.check_credentials(&request.username, &request.password) {
        return Err(ApplicationError::unauthorized("invalid credentials"));
    }
    let token = state.auth.issue(&request.username)?;
    info!(user = %request.username, "Issued access token");
    Ok(Json(LoginResponse { token }))
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Rejects requests without a valid token; stores the [`Claims`] in the
/// request extensions otherwise.
///
/// # Errors
///
/// Returns `Unauthorized` for a missing, malformed or expired token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> ApplicationResult<Response> {
    let token = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .or_else(|| {
            Query::<TokenQuery>::try_from_uri(request.uri())
                .ok()
                .and_then(|Query(q)| q.token)
        })
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApplicationError::unauthorized("missing token"))?;

    let claims = state.auth.verify(&token)?;
    debug!(user = %claims.sub, "Authenticated request");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn auth(ttl: u64) -> JwtAuth {
        JwtAuth::new(&AuthSettings {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: ttl,
            ..AuthSettings::default()
        })
    }

    #[test]
    fn issued_token_verifies() {
        let auth = auth(3600);
        let token = auth.issue("demo").unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.sub, "demo");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = auth(3600).issue("demo").unwrap();
        let other = JwtAuth::new(&AuthSettings {
            jwt_secret: "other".to_string(),
            ..AuthSettings::default()
        });
        assert!(matches!(
            other.verify(&token),
            Err(ApplicationError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = auth(3600);
        let now = Utc::now().timestamp();
        let stale = Claims {
            sub: "demo".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::new(Algorithm::HS256), &stale, &auth.encoding).unwrap();
        assert!(auth.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(auth(60).verify("not.a.jwt").is_err());
    }

    #[test]
    fn credentials_check() {
        let auth = auth(60);
        assert!(auth.check_credentials("demo", "demo123"));
        assert!(!auth.check_credentials("demo", "wrong"));
    }

    #[test]
    fn debug_hides_password() {
        assert!(!format!("{:?}", auth(60)).contains("demo123"));
    }
}
