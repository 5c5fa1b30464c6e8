use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::domain::aggregates::Region;
use crate::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct RegionListResponse {
    pub regions: Vec<Region>,
}

pub async fn list(State(s): State<AppState>) -> Result<Json<RegionListResponse>, ApiError> {
    let mut regions = s.repos.regions.list().await?;
    regions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(RegionListResponse { regions }))
}
