//! One-time verification codes stored in the cache with a TTL.
//!
//! A code is requested for an identifier, stored under
//! `verification:<identifier>`, and consumed by the first successful
//! verification. Expiry is left to the cache.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::Value;
use thiserror::Error;

use crate::cache::CacheService;
use crate::config::OtpConfig;
use crate::domain::value_objects::PhoneNumber;
use crate::sms::{SmsError, SmsSender};

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("failed to deliver verification code: {0}")]
    Delivery(#[from] SmsError),
}

pub struct VerificationService {
    cache: Arc<dyn CacheService>,
    sms: Arc<dyn SmsSender>,
    settings: OtpConfig,
}

fn cache_key(identifier: &str) -> String { format!("verification:{identifier}") }

impl VerificationService {
    pub fn new(cache: Arc<dyn CacheService>, sms: Arc<dyn SmsSender>, settings: OtpConfig) -> Self {
        if settings.test_mode {
            tracing::warn!("OTP test mode enabled: fixed code, no SMS dispatch");
        }
        Self { cache, sms, settings }
    }

    pub fn ttl(&self) -> Duration { self.settings.ttl }

    /// Stores a fresh code for `identifier`, replacing any earlier one.
    pub async fn generate_code(&self, identifier: &str) -> String {
        let code = if self.settings.test_mode { self.settings.test_code.clone() } else { random_code(self.settings.code_length) };
        self.cache.set(&cache_key(identifier), Value::String(code.clone()), self.settings.ttl).await;
        code
    }

    /// Generates a code for the phone number and sends it by SMS.
    /// In test mode nothing is sent.
    pub async fn send_code(&self, phone: &PhoneNumber) -> Result<(), VerificationError> {
        let code = self.generate_code(phone.as_str()).await;
        if self.settings.test_mode {
            tracing::debug!(phone = %phone, code = %code, "test mode: verification code not sent");
            return Ok(());
        }
        let minutes = (self.settings.ttl.as_secs() / 60).max(1);
        let message = format!("Your verification code: {code}. Valid for {minutes} min.");
        self.sms.send(phone, &message).await?;
        tracing::info!(phone = %phone, "verification code sent");
        Ok(())
    }

    /// True once for the stored code; a match consumes it.
    /// Comparison and removal are one cache operation, so concurrent
    /// attempts with the same code succeed at most once.
    pub async fn verify_code(&self, identifier: &str, code: &str) -> bool {
        let code = code.trim();
        if code.is_empty() { return false; }
        self.cache.remove_if(&cache_key(identifier), &Value::String(code.to_string())).await
    }
}

fn random_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length.max(1)).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}
