use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{require_product, DeleteResponse, PageParams, ValidJson};
use crate::app::AppState;
use crate::auth::optional_customer;
use crate::domain::aggregates::{NewReview, RatingSummary, Review, ReviewStatus};
use crate::domain::value_objects::Rating;
use crate::error::ApiError;
use crate::repository::ReviewFilter;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductReviewsResponse {
    pub reviews: Vec<Review>,
    pub count: usize,
    pub limit: u32,
    pub offset: u32,
    pub summary: RatingSummary,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub reviews: Vec<Review>,
    pub count: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1))]
    pub product_id: String,
    /// Defaults to the signed-in customer's name.
    #[validate(length(max = 120))]
    pub author: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminCreateReviewRequest {
    #[serde(flatten)]
    #[validate]
    pub review: CreateReviewRequest,
    pub customer_id: Option<Uuid>,
    pub status: Option<ReviewStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminReviewQuery {
    pub status: Option<String>,
    pub product_id: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Approved reviews of a product, newest first, with a rating summary over all of them.
pub async fn list_for_product(State(s): State<AppState>, Path(product_id): Path<String>, Query(p): Query<PageParams>) -> Result<Json<ProductReviewsResponse>, ApiError> {
    let filter = ReviewFilter { product_id: Some(product_id), status: Some(ReviewStatus::Approved), limit: u32::MAX, offset: 0 };
    let approved = s.repos.reviews.list(&filter).await?;
    let summary = RatingSummary::from_reviews(&approved);
    let (limit, offset) = (p.limit(), p.offset());
    let count = approved.len();
    let reviews = approved.into_iter().skip(offset as usize).take(limit as usize).collect();
    Ok(Json(ProductReviewsResponse { reviews, count, limit, offset, summary }))
}

/// Store submission. Always lands in `pending`.
pub async fn create(State(s): State<AppState>, headers: HeaderMap, ValidJson(r): ValidJson<CreateReviewRequest>) -> Result<(StatusCode, Json<Review>), ApiError> {
    let customer_id = optional_customer(&s, &headers).map(|c| c.sub);
    let author = match r.author.clone().filter(|a| !a.trim().is_empty()) {
        Some(a) => a,
        None => match customer_id {
            Some(id) => s.repos.customers.find(id).await?.and_then(|c| c.display_name()).unwrap_or_default(),
            None => String::new(),
        },
    };
    let review = Review::submit(new_review(r, customer_id, author)?)?;
    persist_new(&s, review).await
}

pub async fn admin_list(State(s): State<AppState>, Query(q): Query<AdminReviewQuery>) -> Result<Json<ReviewListResponse>, ApiError> {
    let status = q.status.as_deref().map(str::parse::<ReviewStatus>).transpose()?;
    let page = PageParams { limit: q.limit, offset: q.offset };
    let filter = ReviewFilter { product_id: q.product_id.clone(), status, limit: page.limit(), offset: page.offset() };
    let reviews = s.repos.reviews.list(&filter).await?;
    let count = s.repos.reviews.count(&filter).await?;
    Ok(Json(ReviewListResponse { reviews, count, limit: filter.limit, offset: filter.offset }))
}

pub async fn admin_create(State(s): State<AppState>, ValidJson(r): ValidJson<AdminCreateReviewRequest>) -> Result<(StatusCode, Json<Review>), ApiError> {
    let author = r.review.author.clone().unwrap_or_default();
    let review = Review::create(new_review(r.review, r.customer_id, author)?, r.status.unwrap_or_default())?;
    persist_new(&s, review).await
}

pub async fn admin_get(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Review>, ApiError> {
    Ok(Json(load(&s, id).await?))
}

pub async fn approve(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Review>, ApiError> {
    let mut review = load(&s, id).await?;
    review.approve()?;
    Ok(Json(store(&s, review).await?))
}

pub async fn reject(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Review>, ApiError> {
    let mut review = load(&s, id).await?;
    review.reject()?;
    Ok(Json(store(&s, review).await?))
}

pub async fn admin_delete(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<DeleteResponse>, ApiError> {
    let mut review = load(&s, id).await?;
    review.delete()?;
    store(&s, review).await?;
    Ok(Json(DeleteResponse::new(id, "review")))
}

fn new_review(r: CreateReviewRequest, customer_id: Option<Uuid>, author: String) -> Result<NewReview, ApiError> {
    Ok(NewReview { product_id: r.product_id, customer_id, author, rating: Rating::new(r.rating)?, title: r.title, content: r.content })
}

async fn persist_new(s: &AppState, review: Review) -> Result<(StatusCode, Json<Review>), ApiError> {
    require_product(s, review.product_id()).await?;
    let review = store(s, review).await?;
    tracing::info!(review_id = %review.id(), product_id = review.product_id(), status = %review.status(), "review created");
    Ok((StatusCode::CREATED, Json(review)))
}

async fn load(s: &AppState, id: Uuid) -> Result<Review, ApiError> {
    s.repos.reviews.find(id).await?.ok_or(ApiError::NotFound("review"))
}

async fn store(s: &AppState, mut review: Review) -> Result<Review, ApiError> {
    s.repos.reviews.save(&review).await?;
    s.events.publish(review.take_events()).await;
    Ok(review)
}
