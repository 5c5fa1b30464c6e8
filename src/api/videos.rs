use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{require_product, DeleteResponse, ValidJson};
use crate::app::AppState;
use crate::domain::aggregates::{ProductVideo, ProductVideoChanges};
use crate::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoListResponse {
    pub videos: Vec<ProductVideo>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVideoRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(url)]
    pub url: String,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    pub rank: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVideoRequest {
    #[validate(url)]
    pub url: Option<String>,
    /// `null` clears the title.
    #[serde(default, deserialize_with = "super::nullable")]
    #[validate(length(max = 200))]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[validate(url)]
    #[schema(value_type = Option<String>)]
    pub thumbnail_url: Option<Option<String>>,
    pub rank: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoQuery {
    pub product_id: Option<String>,
}

pub async fn list_for_product(State(s): State<AppState>, Path(product_id): Path<String>) -> Result<Json<VideoListResponse>, ApiError> {
    Ok(Json(VideoListResponse { videos: s.repos.videos.list(Some(&product_id)).await? }))
}

pub async fn admin_list(State(s): State<AppState>, Query(q): Query<VideoQuery>) -> Result<Json<VideoListResponse>, ApiError> {
    Ok(Json(VideoListResponse { videos: s.repos.videos.list(q.product_id.as_deref()).await? }))
}

pub async fn admin_create(State(s): State<AppState>, ValidJson(r): ValidJson<CreateVideoRequest>) -> Result<(StatusCode, Json<ProductVideo>), ApiError> {
    require_product(&s, &r.product_id).await?;
    let video = ProductVideo::create(r.product_id, r.url, r.title, r.thumbnail_url, r.rank.unwrap_or(0))?;
    s.repos.videos.save(&video).await?;
    tracing::info!(video_id = %video.id, product_id = %video.product_id, "product video added");
    Ok((StatusCode::CREATED, Json(video)))
}

pub async fn admin_get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProductVideo>, ApiError> {
    Ok(Json(load(&s, id).await?))
}

pub async fn admin_update(State(s): State<AppState>, Path(id): Path<Uuid>, ValidJson(r): ValidJson<UpdateVideoRequest>) -> Result<Json<ProductVideo>, ApiError> {
    let mut video = load(&s, id).await?;
    video.apply(ProductVideoChanges { url: r.url, title: r.title, thumbnail_url: r.thumbnail_url, rank: r.rank })?;
    s.repos.videos.save(&video).await?;
    Ok(Json(video))
}

pub async fn admin_delete(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<DeleteResponse>, ApiError> {
    let mut video = load(&s, id).await?;
    video.delete();
    s.repos.videos.save(&video).await?;
    Ok(Json(DeleteResponse::new(id, "product_video")))
}

async fn load(s: &AppState, id: Uuid) -> Result<ProductVideo, ApiError> {
    s.repos.videos.find(id).await?.ok_or(ApiError::NotFound("product video"))
}
