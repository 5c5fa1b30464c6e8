//! Phone login: request a code by SMS, exchange it for a customer token.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::ValidJson;
use crate::app::AppState;
use crate::domain::aggregates::{Customer, CustomerProfile};
use crate::domain::value_objects::PhoneNumber;
use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SmsSendRequest {
    #[validate(length(min = 10, max = 32))]
    pub phone: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SmsSendResponse {
    pub success: bool,
    pub phone: PhoneNumber,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SmsVerifyRequest {
    #[validate(length(min = 10, max = 32))]
    pub phone: String,
    #[validate(length(min = 1, max = 12))]
    pub code: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SmsVerifyResponse {
    pub token: String,
    pub expires_in: u64,
    pub customer: Customer,
    pub is_new: bool,
}

pub async fn send(State(s): State<AppState>, ValidJson(r): ValidJson<SmsSendRequest>) -> Result<Json<SmsSendResponse>, ApiError> {
    let phone = PhoneNumber::parse(&r.phone)?;
    s.verification.send_code(&phone).await?;
    Ok(Json(SmsSendResponse { success: true, phone, expires_in: s.verification.ttl().as_secs() }))
}

/// Verifies the code, then finds or registers the customer and issues a token.
pub async fn verify(State(s): State<AppState>, ValidJson(r): ValidJson<SmsVerifyRequest>) -> Result<Json<SmsVerifyResponse>, ApiError> {
    let phone = PhoneNumber::parse(&r.phone)?;
    if !s.verification.verify_code(phone.as_str(), &r.code).await {
        tracing::info!(phone = %phone, "sms login rejected: invalid or expired code");
        return Err(ApiError::Unauthorized("invalid or expired verification code".into()));
    }

    let profile = CustomerProfile { email: r.email, first_name: r.first_name, last_name: r.last_name };
    let (customer, is_new) = match s.repos.customers.find_by_phone(&phone).await? {
        Some(existing) => (update_profile(&s, existing, profile).await?, false),
        None => {
            let (customer, event) = Customer::register(phone.clone(), profile.clone());
            if s.repos.customers.insert_new(&customer).await? {
                s.events.publish(vec![event]).await;
                tracing::info!(customer_id = %customer.id, "customer registered by phone");
                (customer, true)
            } else {
                // A concurrent login registered the phone first.
                let existing = s.repos.customers.find_by_phone(&phone).await?
                    .ok_or_else(|| ApiError::Internal(format!("customer for {phone} vanished after conflict")))?;
                (update_profile(&s, existing, profile).await?, false)
            }
        }
    };

    let token = s.jwt.issue(&customer)?;
    Ok(Json(SmsVerifyResponse { token, expires_in: s.jwt.ttl().as_secs(), customer, is_new }))
}

async fn update_profile(s: &AppState, mut customer: Customer, profile: CustomerProfile) -> Result<Customer, ApiError> {
    if customer.complete_profile(profile) {
        s.repos.customers.save(&customer).await?;
    }
    Ok(customer)
}
