use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::app::AppState;
use crate::cache::{get_as, set_as};
use crate::domain::aggregates::Product;
use crate::error::ApiError;

const SEARCH_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub products: Vec<Product>,
    pub count: usize,
}

fn search_key(query: &str, limit: u32) -> String { format!("search:{query}:{limit}") }

/// Published products matching `q`; results are cached for a minute.
pub async fn search(State(s): State<AppState>, Query(p): Query<SearchQuery>) -> Result<Json<SearchResponse>, ApiError> {
    let query = p.q.as_deref().map(str::trim).unwrap_or_default().to_lowercase();
    if query.is_empty() { return Err(ApiError::BadRequest("query parameter 'q' is required".into())); }
    let limit = p.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let key = search_key(&query, limit);
    if let Some(hit) = get_as::<SearchResponse>(s.cache.as_ref(), &key).await {
        tracing::debug!(query = %query, "search served from cache");
        return Ok(Json(hit));
    }
    let products = s.repos.products.search(&query, limit).await?;
    let response = SearchResponse { count: products.len(), query, products };
    set_as(s.cache.as_ref(), &key, &response, SEARCH_TTL).await;
    Ok(Json(response))
}
