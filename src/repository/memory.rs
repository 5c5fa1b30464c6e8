//! In-memory store implementing every repository trait.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::*;
use crate::domain::aggregates::ReviewRecord;

#[derive(Default)]
pub struct InMemoryStore {
    reviews: RwLock<HashMap<Uuid, ReviewRecord>>,
    videos: RwLock<HashMap<Uuid, ProductVideo>>,
    media: RwLock<HashMap<Uuid, ProductMedia>>,
    banners: RwLock<HashMap<Uuid, Banner>>,
    customers: RwLock<HashMap<Uuid, Customer>>,
    products: RwLock<Vec<Product>>,
    regions: RwLock<Vec<Region>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> { lock.read().unwrap_or_else(PoisonError::into_inner) }
fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> { lock.write().unwrap_or_else(PoisonError::into_inner) }

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_products(self, products: impl IntoIterator<Item = Product>) -> Self {
        write(&self.products).extend(products);
        self
    }

    pub fn with_regions(self, regions: impl IntoIterator<Item = Region>) -> Self {
        self.replace_regions(regions);
        self
    }

    /// Swaps the region catalog, as an admin editing regions would.
    pub fn replace_regions(&self, regions: impl IntoIterator<Item = Region>) {
        *write(&self.regions) = regions.into_iter().collect();
    }
}

fn review_matches(r: &ReviewRecord, f: &ReviewFilter) -> bool {
    r.deleted_at.is_none()
        && f.product_id.as_deref().map_or(true, |p| r.product_id == p)
        && f.status.map_or(true, |s| r.status == s)
}

#[async_trait]
impl ReviewRepository for InMemoryStore {
    async fn save(&self, review: &Review) -> RepoResult<()> {
        write(&self.reviews).insert(review.id(), review.to_record());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Review>> {
        Ok(read(&self.reviews).get(&id).filter(|r| r.deleted_at.is_none()).cloned().map(Review::restore))
    }

    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let mut rows: Vec<ReviewRecord> = read(&self.reviews).values().filter(|r| review_matches(r, filter)).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows.into_iter().skip(filter.offset as usize).take(filter.limit as usize).map(Review::restore).collect())
    }

    async fn count(&self, filter: &ReviewFilter) -> RepoResult<u64> {
        Ok(read(&self.reviews).values().filter(|r| review_matches(r, filter)).count() as u64)
    }
}

#[async_trait]
impl ProductVideoRepository for InMemoryStore {
    async fn save(&self, video: &ProductVideo) -> RepoResult<()> {
        write(&self.videos).insert(video.id, video.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<ProductVideo>> {
        Ok(read(&self.videos).get(&id).filter(|v| !v.is_deleted()).cloned())
    }

    async fn list(&self, product_id: Option<&str>) -> RepoResult<Vec<ProductVideo>> {
        let mut out: Vec<ProductVideo> = read(&self.videos).values()
            .filter(|v| !v.is_deleted() && product_id.map_or(true, |p| v.product_id == p))
            .cloned().collect();
        out.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.created_at.cmp(&b.created_at)));
        Ok(out)
    }
}

#[async_trait]
impl ProductMediaRepository for InMemoryStore {
    async fn save(&self, media: &ProductMedia) -> RepoResult<()> {
        write(&self.media).insert(media.id, media.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<ProductMedia>> {
        Ok(read(&self.media).get(&id).filter(|m| !m.is_deleted()).cloned())
    }

    async fn list(&self, product_id: Option<&str>, kind: Option<MediaKind>) -> RepoResult<Vec<ProductMedia>> {
        let mut out: Vec<ProductMedia> = read(&self.media).values()
            .filter(|m| !m.is_deleted() && product_id.map_or(true, |p| m.product_id == p) && kind.map_or(true, |k| m.kind == k))
            .cloned().collect();
        out.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.created_at.cmp(&b.created_at)));
        Ok(out)
    }
}

#[async_trait]
impl BannerRepository for InMemoryStore {
    async fn save(&self, banner: &Banner) -> RepoResult<()> {
        write(&self.banners).insert(banner.id, banner.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Banner>> {
        Ok(read(&self.banners).get(&id).filter(|b| !b.is_deleted()).cloned())
    }

    async fn list(&self) -> RepoResult<Vec<Banner>> {
        let mut out: Vec<Banner> = read(&self.banners).values().filter(|b| !b.is_deleted()).cloned().collect();
        out.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.created_at.cmp(&b.created_at)));
        Ok(out)
    }
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn save(&self, customer: &Customer) -> RepoResult<()> {
        write(&self.customers).insert(customer.id, customer.clone());
        Ok(())
    }

    async fn insert_new(&self, customer: &Customer) -> RepoResult<bool> {
        let mut customers = write(&self.customers);
        if customers.values().any(|c| c.phone == customer.phone) { return Ok(false); }
        customers.insert(customer.id, customer.clone());
        Ok(true)
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Customer>> {
        Ok(read(&self.customers).get(&id).cloned())
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> RepoResult<Option<Customer>> {
        Ok(read(&self.customers).values().find(|c| &c.phone == phone).cloned())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn find(&self, id: &str) -> RepoResult<Option<Product>> {
        Ok(read(&self.products).iter().find(|p| p.id == id).cloned())
    }

    async fn search(&self, query: &str, limit: u32) -> RepoResult<Vec<Product>> {
        let mut hits: Vec<Product> = read(&self.products).iter().filter(|p| p.is_published() && p.matches(query)).cloned().collect();
        hits.sort_by(|a, b| a.title.cmp(&b.title));
        hits.truncate(limit as usize);
        Ok(hits)
    }
}

#[async_trait]
impl RegionRepository for InMemoryStore {
    async fn list(&self) -> RepoResult<Vec<Region>> {
        Ok(read(&self.regions).clone())
    }
}
