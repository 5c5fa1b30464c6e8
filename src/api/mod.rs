//! REST handlers for `/store/*` and `/admin/*`.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::domain::aggregates::Product;
use crate::error::ApiError;

pub mod banners;
pub mod cache_demo;
pub mod customers;
pub mod media;
pub mod openapi;
pub mod otp;
pub mod regions;
pub mod reviews;
pub mod search;
pub mod sms_auth;
pub mod videos;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// For partial updates: a missing field is `None`, an explicit `null` is
/// `Some(None)`. Use with `#[serde(default, deserialize_with = "nullable")]`.
pub(crate) fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// JSON body that has been deserialized and validated. Both failures are 400s.
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageParams {
    pub fn limit(&self) -> u32 { self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE) }
    pub fn offset(&self) -> u32 { self.offset.unwrap_or(0) }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub id: Uuid,
    pub object: String,
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(id: Uuid, object: &'static str) -> Self { Self { id, object: object.to_string(), deleted: true } }
}

/// Loads a product that attachments and reviews may reference.
pub(crate) async fn require_product(state: &AppState, id: &str) -> Result<Product, ApiError> {
    state.repos.products.find(id).await?.ok_or(ApiError::NotFound("product"))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "storefront-services" }))
}
