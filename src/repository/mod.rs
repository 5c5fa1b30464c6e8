//! Persistence seams. Each aggregate has a repository trait with a
//! PostgreSQL implementation (`postgres`) and an in-memory one (`memory`)
//! used in development and tests.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::{Banner, Customer, Product, ProductMedia, ProductVideo, Region, Review, ReviewStatus};
use crate::domain::value_objects::{MediaKind, PhoneNumber};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Clone, Debug, Default)]
pub struct ReviewFilter {
    pub product_id: Option<String>,
    pub status: Option<ReviewStatus>,
    pub limit: u32,
    pub offset: u32,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Inserts or replaces the review (including soft-deleted state).
    async fn save(&self, review: &Review) -> RepoResult<()>;
    /// Non-deleted review by id.
    async fn find(&self, id: Uuid) -> RepoResult<Option<Review>>;
    /// Non-deleted reviews matching the filter, newest first.
    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>>;
    /// Number of non-deleted reviews matching the filter, ignoring paging.
    async fn count(&self, filter: &ReviewFilter) -> RepoResult<u64>;
}

#[async_trait]
pub trait ProductVideoRepository: Send + Sync {
    async fn save(&self, video: &ProductVideo) -> RepoResult<()>;
    async fn find(&self, id: Uuid) -> RepoResult<Option<ProductVideo>>;
    /// Non-deleted videos ordered by rank, optionally for one product.
    async fn list(&self, product_id: Option<&str>) -> RepoResult<Vec<ProductVideo>>;
}

#[async_trait]
pub trait ProductMediaRepository: Send + Sync {
    async fn save(&self, media: &ProductMedia) -> RepoResult<()>;
    async fn find(&self, id: Uuid) -> RepoResult<Option<ProductMedia>>;
    async fn list(&self, product_id: Option<&str>, kind: Option<MediaKind>) -> RepoResult<Vec<ProductMedia>>;
}

#[async_trait]
pub trait BannerRepository: Send + Sync {
    async fn save(&self, banner: &Banner) -> RepoResult<()>;
    async fn find(&self, id: Uuid) -> RepoResult<Option<Banner>>;
    /// Non-deleted banners ordered by rank.
    async fn list(&self) -> RepoResult<Vec<Banner>>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn save(&self, customer: &Customer) -> RepoResult<()>;
    /// Inserts a new customer unless the phone is already registered.
    /// Returns `false` when another customer holds the phone.
    async fn insert_new(&self, customer: &Customer) -> RepoResult<bool>;
    async fn find(&self, id: Uuid) -> RepoResult<Option<Customer>>;
    async fn find_by_phone(&self, phone: &PhoneNumber) -> RepoResult<Option<Customer>>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find(&self, id: &str) -> RepoResult<Option<Product>>;
    /// Published products matching the query, ordered by title.
    async fn search(&self, query: &str, limit: u32) -> RepoResult<Vec<Product>>;
}

#[async_trait]
pub trait RegionRepository: Send + Sync {
    async fn list(&self) -> RepoResult<Vec<Region>>;
}

/// All repositories behind trait objects, as stored in the application state.
#[derive(Clone)]
pub struct Repositories {
    pub reviews: Arc<dyn ReviewRepository>,
    pub videos: Arc<dyn ProductVideoRepository>,
    pub media: Arc<dyn ProductMediaRepository>,
    pub banners: Arc<dyn BannerRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub regions: Arc<dyn RegionRepository>,
}

impl Repositories {
    /// Uses one store for every aggregate.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ReviewRepository + ProductVideoRepository + ProductMediaRepository + BannerRepository
            + CustomerRepository + ProductRepository + RegionRepository + 'static,
    {
        Self {
            reviews: store.clone(),
            videos: store.clone(),
            media: store.clone(),
            banners: store.clone(),
            customers: store.clone(),
            products: store.clone(),
            regions: store,
        }
    }
}
