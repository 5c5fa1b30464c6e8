use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::ValidJson;
use crate::app::AppState;
use crate::domain::value_objects::PhoneNumber;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendCodeRequest {
    /// Phone number the code is sent to by SMS.
    #[validate(length(min = 3, max = 254))]
    pub identifier: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendCodeResponse {
    pub sent: bool,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyCodeRequest {
    #[validate(length(min = 3, max = 254))]
    pub identifier: String,
    #[validate(length(min = 1, max = 12))]
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

/// Codes are delivered by SMS only; identifiers that are not phone
/// numbers are rejected before anything is stored.
pub async fn send(State(s): State<AppState>, ValidJson(r): ValidJson<SendCodeRequest>) -> Result<Json<SendCodeResponse>, ApiError> {
    let phone = PhoneNumber::parse(&r.identifier)
        .map_err(|_| ApiError::BadRequest("identifier must be a phone number".into()))?;
    s.verification.send_code(&phone).await?;
    Ok(Json(SendCodeResponse { sent: true, expires_in: s.verification.ttl().as_secs() }))
}

pub async fn verify(State(s): State<AppState>, ValidJson(r): ValidJson<VerifyCodeRequest>) -> Json<VerifyCodeResponse> {
    let identifier = PhoneNumber::parse(&r.identifier).map(String::from).unwrap_or_else(|_| r.identifier.trim().to_string());
    Json(VerifyCodeResponse { verified: s.verification.verify_code(&identifier, &r.code).await })
}
