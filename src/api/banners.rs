use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{DeleteResponse, ValidJson};
use crate::app::AppState;
use crate::domain::aggregates::{Banner, BannerChanges, BannerDraft};
use crate::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct BannerListResponse {
    pub banners: Vec<Banner>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBannerRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
    pub rank: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBannerRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// `null` clears the field; leaving it out keeps the current value.
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>)]
    pub subtitle: Option<Option<String>>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>)]
    pub link_url: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub rank: Option<i32>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub starts_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub ends_at: Option<Option<DateTime<Utc>>>,
}

/// Banners visible right now, by rank.
pub async fn list_visible(State(s): State<AppState>) -> Result<Json<BannerListResponse>, ApiError> {
    let now = Utc::now();
    let banners = s.repos.banners.list().await?.into_iter().filter(|b| b.is_visible_at(now)).collect();
    Ok(Json(BannerListResponse { banners }))
}

pub async fn admin_list(State(s): State<AppState>) -> Result<Json<BannerListResponse>, ApiError> {
    Ok(Json(BannerListResponse { banners: s.repos.banners.list().await? }))
}

pub async fn admin_create(State(s): State<AppState>, ValidJson(r): ValidJson<CreateBannerRequest>) -> Result<(StatusCode, Json<Banner>), ApiError> {
    let banner = Banner::create(BannerDraft {
        title: r.title, subtitle: r.subtitle, image_url: r.image_url, link_url: r.link_url,
        is_active: r.is_active.unwrap_or(true), rank: r.rank.unwrap_or(0), starts_at: r.starts_at, ends_at: r.ends_at,
    })?;
    s.repos.banners.save(&banner).await?;
    tracing::info!(banner_id = %banner.id, "banner created");
    Ok((StatusCode::CREATED, Json(banner)))
}

pub async fn admin_get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Banner>, ApiError> {
    Ok(Json(load(&s, id).await?))
}

pub async fn admin_update(State(s): State<AppState>, Path(id): Path<Uuid>, ValidJson(r): ValidJson<UpdateBannerRequest>) -> Result<Json<Banner>, ApiError> {
    let mut banner = load(&s, id).await?;
    banner.apply(BannerChanges {
        title: r.title, subtitle: r.subtitle, image_url: r.image_url, link_url: r.link_url,
        is_active: r.is_active, rank: r.rank, starts_at: r.starts_at, ends_at: r.ends_at,
    })?;
    s.repos.banners.save(&banner).await?;
    Ok(Json(banner))
}

pub async fn admin_delete(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<DeleteResponse>, ApiError> {
    let mut banner = load(&s, id).await?;
    banner.delete();
    s.repos.banners.save(&banner).await?;
    Ok(Json(DeleteResponse::new(id, "banner")))
}

async fn load(s: &AppState, id: Uuid) -> Result<Banner, ApiError> {
    s.repos.banners.find(id).await?.ok_or(ApiError::NotFound("banner"))
}
