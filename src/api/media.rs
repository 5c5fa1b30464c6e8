use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{require_product, DeleteResponse, ValidJson};
use crate::app::AppState;
use crate::domain::aggregates::{ProductMedia, ProductMediaChanges};
use crate::domain::value_objects::MediaKind;
use crate::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct MediaListResponse {
    pub media: Vec<ProductMedia>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMediaRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    /// `image` (default) or `video`.
    pub kind: Option<String>,
    #[validate(url)]
    pub url: String,
    #[validate(length(max = 300))]
    pub alt_text: Option<String>,
    pub rank: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMediaRequest {
    pub kind: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    #[validate(length(max = 300))]
    #[schema(value_type = Option<String>)]
    pub alt_text: Option<Option<String>>,
    pub rank: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaQuery {
    pub product_id: Option<String>,
    pub kind: Option<String>,
}

fn parse_kind(raw: Option<&str>) -> Result<Option<MediaKind>, ApiError> {
    Ok(raw.map(str::parse::<MediaKind>).transpose()?)
}

pub async fn list_for_product(State(s): State<AppState>, Path(product_id): Path<String>, Query(q): Query<MediaQuery>) -> Result<Json<MediaListResponse>, ApiError> {
    let kind = parse_kind(q.kind.as_deref())?;
    Ok(Json(MediaListResponse { media: s.repos.media.list(Some(&product_id), kind).await? }))
}

pub async fn admin_list(State(s): State<AppState>, Query(q): Query<MediaQuery>) -> Result<Json<MediaListResponse>, ApiError> {
    let kind = parse_kind(q.kind.as_deref())?;
    Ok(Json(MediaListResponse { media: s.repos.media.list(q.product_id.as_deref(), kind).await? }))
}

pub async fn admin_create(State(s): State<AppState>, ValidJson(r): ValidJson<CreateMediaRequest>) -> Result<(StatusCode, Json<ProductMedia>), ApiError> {
    let kind = parse_kind(r.kind.as_deref())?.unwrap_or_default();
    require_product(&s, &r.product_id).await?;
    let media = ProductMedia::create(r.product_id, kind, r.url, r.alt_text, r.rank.unwrap_or(0))?;
    s.repos.media.save(&media).await?;
    tracing::info!(media_id = %media.id, product_id = %media.product_id, kind = media.kind.as_str(), "product media added");
    Ok((StatusCode::CREATED, Json(media)))
}

pub async fn admin_get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<ProductMedia>, ApiError> {
    Ok(Json(load(&s, id).await?))
}

pub async fn admin_update(State(s): State<AppState>, Path(id): Path<Uuid>, ValidJson(r): ValidJson<UpdateMediaRequest>) -> Result<Json<ProductMedia>, ApiError> {
    let kind = parse_kind(r.kind.as_deref())?;
    let mut media = load(&s, id).await?;
    media.apply(ProductMediaChanges { kind, url: r.url, alt_text: r.alt_text, rank: r.rank })?;
    s.repos.media.save(&media).await?;
    Ok(Json(media))
}

pub async fn admin_delete(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<DeleteResponse>, ApiError> {
    let mut media = load(&s, id).await?;
    media.delete();
    s.repos.media.save(&media).await?;
    Ok(Json(DeleteResponse::new(id, "product_media")))
}

async fn load(s: &AppState, id: Uuid) -> Result<ProductMedia, ApiError> {
    s.repos.media.find(id).await?.ok_or(ApiError::NotFound("product media"))
}
