//! Outbound SMS: the SMSC HTTP gateway and a logging stand-in for development.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::SmscConfig;
use crate::domain::value_objects::PhoneNumber;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("sms gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sms gateway rejected message (code {code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("unexpected sms gateway response: {0}")]
    BadResponse(String),
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &PhoneNumber, message: &str) -> Result<(), SmsError>;
}

/// Accepted message as reported by SMSC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmscReceipt {
    pub id: i64,
    pub parts: i64,
}

#[derive(Deserialize)]
struct SmscResponse {
    id: Option<i64>,
    cnt: Option<i64>,
    error: Option<String>,
    error_code: Option<i64>,
}

/// Interprets a `fmt=3` (JSON) response body from `send.php`.
pub fn parse_smsc_response(body: &str) -> Result<SmscReceipt, SmsError> {
    let r: SmscResponse = serde_json::from_str(body).map_err(|_| SmsError::BadResponse(body.chars().take(200).collect()))?;
    if let Some(message) = r.error {
        return Err(SmsError::Rejected { code: r.error_code.unwrap_or_default(), message });
    }
    match r.id {
        Some(id) => Ok(SmscReceipt { id, parts: r.cnt.unwrap_or(1) }),
        None => Err(SmsError::BadResponse(body.chars().take(200).collect())),
    }
}

pub struct SmscClient {
    http: reqwest::Client,
    config: SmscConfig,
}

impl SmscClient {
    pub fn new(config: SmscConfig) -> Result<Self, SmsError> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/sys/send.php", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SmsSender for SmscClient {
    async fn send(&self, to: &PhoneNumber, message: &str) -> Result<(), SmsError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("login", self.config.login.as_str()),
            ("psw", self.config.password.as_str()),
            ("phones", to.digits()),
            ("mes", message),
            ("charset", "utf-8"),
            ("fmt", "3"),
        ];
        if let Some(sender) = &self.config.sender { query.push(("sender", sender.as_str())); }

        let body = self.http.get(self.endpoint()).query(&query).send().await?.error_for_status()?.text().await?;
        let receipt = parse_smsc_response(&body)?;
        tracing::info!(message_id = receipt.id, parts = receipt.parts, "sms accepted by gateway");
        Ok(())
    }
}

/// Logs instead of sending. Used when no gateway credentials are configured.
#[derive(Debug, Default, Clone)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, to: &PhoneNumber, _message: &str) -> Result<(), SmsError> {
        tracing::info!(phone = %to, "sms gateway not configured; message not sent");
        Ok(())
    }
}
