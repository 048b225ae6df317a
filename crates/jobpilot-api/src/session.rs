//! Session-cookie identity verification.
//!
//! A signed HS256 JWT carried in an http-only cookie. The claim set is
//! whatever the caller supplied at issuance; this service mandates no
//! fields beyond the standard `iat`/`exp` pair it adds itself.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

/// Session signing/verification keys plus token lifetime.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Load the shared secret from `JWT_SECRET`.
    pub fn from_env(ttl_days: i64) -> Result<Self, ApiError> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| ApiError::internal("JWT_SECRET must be set to sign session cookies"))?;
        if secret.is_empty() {
            return Err(ApiError::internal("JWT_SECRET cannot be empty"));
        }
        Ok(Self::new(secret.as_bytes(), ttl_days))
    }

    /// Sign the caller-supplied claim set, stamping `iat` and `exp`.
    pub fn issue(&self, claims: serde_json::Map<String, Value>) -> Result<String, ApiError> {
        let now = Utc::now();
        let mut claims = claims;
        claims.insert("iat".to_string(), Value::from(now.timestamp()));
        claims.insert("exp".to_string(), Value::from((now + self.ttl).timestamp()));

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to sign session token: {}", e)))
    }

    /// Verify signature and expiry, yielding the decoded claim set.
    pub fn verify(&self, token: &str) -> Result<serde_json::Map<String, Value>, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;

        decode::<serde_json::Map<String, Value>>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::unauthorized(format!("Invalid session token: {}", e)))
    }
}

/// Build the http-only session cookie around a signed token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie
}

/// Caller identity established from a verified session cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The decoded claim set, exactly as signed at issuance.
    pub claims: serde_json::Map<String, Value>,
}

impl SessionUser {
    pub fn email(&self) -> Option<&str> {
        self.claims.get("email").and_then(Value::as_str)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let cookie = jar
            .get(SESSION_COOKIE)
            .ok_or_else(|| ApiError::unauthorized("Missing session cookie"))?;

        let claims = state.session.verify(cookie.value())?;

        Ok(SessionUser { claims })
    }
}
