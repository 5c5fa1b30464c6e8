//! Customer JWTs and the request guards for store and admin routes.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::aggregates::Customer;
use crate::error::ApiError;

pub const CUSTOMER_ACTOR: &str = "customer";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("token encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerClaims {
    pub sub: Uuid,
    pub phone: String,
    pub actor_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 customer tokens.
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self { encoding: EncodingKey::from_secret(secret.as_bytes()), decoding: DecodingKey::from_secret(secret.as_bytes()), ttl }
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    pub fn issue(&self, customer: &Customer) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = CustomerClaims {
            sub: customer.id,
            phone: customer.phone.to_string(),
            actor_type: CUSTOMER_ACTOR.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| AuthError::Encode(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<CustomerClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<CustomerClaims>(token, &self.decoding, &validation).map_err(|_| AuthError::InvalidToken)?;
        if data.claims.actor_type != CUSTOMER_ACTOR { return Err(AuthError::InvalidToken); }
        Ok(data.claims)
    }
}

pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(axum::http::header::AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let header = header.to_str().map_err(|_| AuthError::MissingToken)?;
    let token = header.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)?.trim();
    if token.is_empty() { return Err(AuthError::MissingToken); }
    Ok(token)
}

/// Claims of the authenticated customer, inserted by [`require_customer`].
#[derive(Debug, Clone)]
pub struct AuthenticatedCustomer(pub CustomerClaims);

/// Claims from an optional bearer token; a bad token counts as anonymous.
pub fn optional_customer(state: &AppState, headers: &HeaderMap) -> Option<CustomerClaims> {
    let token = extract_bearer(headers).ok()?;
    state.jwt.validate(token).ok()
}

pub async fn require_customer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = match extract_bearer(req.headers()).and_then(|t| state.jwt.validate(t)) {
        Ok(c) => c,
        Err(e) => return ApiError::from(e).into_response(),
    };
    req.extensions_mut().insert(AuthenticatedCustomer(claims));
    next.run(req).await
}

/// Admin guard: `Authorization: Bearer <key>` or `x-api-key: <key>`.
/// With no key configured the admin API is open.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(expected) = state.admin_api_key.as_deref() {
        let headers = req.headers();
        let presented = extract_bearer(headers).ok()
            .or_else(|| headers.get("x-api-key").and_then(|v| v.to_str().ok()));
        if presented != Some(expected) {
            return ApiError::from(AuthError::InvalidApiKey).into_response();
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CustomerProfile;
    use crate::domain::value_objects::PhoneNumber;
    use axum::http::HeaderValue;

    fn customer() -> Customer {
        Customer::register(PhoneNumber::parse("+15551112222").unwrap(), CustomerProfile::default()).0
    }

    #[test]
    fn test_issue_and_validate() {
        let jwt = JwtIssuer::new("secret", Duration::from_secs(60));
        let c = customer();
        let claims = jwt.validate(&jwt.issue(&c).unwrap()).unwrap();
        assert_eq!(claims.sub, c.id);
        assert_eq!(claims.phone, "+15551112222");
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = JwtIssuer::new("one", Duration::from_secs(60)).issue(&customer()).unwrap();
        assert!(matches!(JwtIssuer::new("two", Duration::from_secs(60)).validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_rejects_expired() {
        let jwt = JwtIssuer::new("secret", Duration::ZERO);
        let token = jwt.issue(&customer()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(jwt.validate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer() {
        let mut h = HeaderMap::new();
        assert!(matches!(extract_bearer(&h), Err(AuthError::MissingToken)));
        h.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&h).is_err());
        h.insert("authorization", HeaderValue::from_static("Bearer  tok "));
        assert_eq!(extract_bearer(&h).unwrap(), "tok");
    }
}
