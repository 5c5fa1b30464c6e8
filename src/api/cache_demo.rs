//! Shows the cache at work: the first read computes a payload, later reads
//! are served from the cache until the TTL runs out.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::app::AppState;
use crate::error::ApiError;

const DEMO_KEY: &str = "cache-demo";
const DEFAULT_TTL_SECS: u64 = 30;
pub const MAX_TTL_SECS: u64 = 86_400;

#[derive(Debug, Default, Deserialize)]
pub struct DemoQuery {
    pub ttl: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DemoResponse {
    /// `cache` or `computed`.
    pub source: String,
    pub ttl: u64,
    #[schema(value_type = Object)]
    pub data: Value,
}

pub async fn get(State(s): State<AppState>, Query(q): Query<DemoQuery>) -> Result<Json<DemoResponse>, ApiError> {
    let ttl = q.ttl.unwrap_or(DEFAULT_TTL_SECS);
    if ttl > MAX_TTL_SECS {
        return Err(ApiError::BadRequest(format!("ttl must be at most {MAX_TTL_SECS} seconds")));
    }
    if let Some(data) = s.cache.get(DEMO_KEY).await {
        return Ok(Json(DemoResponse { source: "cache".into(), ttl, data }));
    }
    let data = json!({ "generated_at": Utc::now(), "value": rand::random::<u32>() });
    s.cache.set(DEMO_KEY, data.clone(), Duration::from_secs(ttl)).await;
    Ok(Json(DemoResponse { source: "computed".into(), ttl, data }))
}

pub async fn clear(State(s): State<AppState>) -> Json<Value> {
    s.cache.delete(DEMO_KEY).await;
    Json(json!({ "cleared": true }))
}
