//! PostgreSQL store (sqlx). Schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::*;
use crate::domain::aggregates::{ProductStatus, ReviewError, ReviewRecord};
use crate::domain::value_objects::{MediaKindError, Rating};

#[derive(Clone)]
pub struct PgStore { pool: PgPool }

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool { &self.pool }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid, product_id: String, customer_id: Option<Uuid>, author: String, rating: i16, title: Option<String>,
    content: String, status: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>, deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;
    fn try_from(r: ReviewRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(r.rating).ok().and_then(|v| Rating::new(v).ok())
            .ok_or_else(|| RepositoryError::Corrupt(format!("review {} has rating {}", r.id, r.rating)))?;
        let status = r.status.parse().map_err(|e: ReviewError| RepositoryError::Corrupt(e.to_string()))?;
        Ok(Review::restore(ReviewRecord {
            id: r.id, product_id: r.product_id, customer_id: r.customer_id, author: r.author, rating, title: r.title,
            content: r.content, status, created_at: r.created_at, updated_at: r.updated_at, deleted_at: r.deleted_at,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: Uuid, product_id: String, kind: String, url: String, alt_text: Option<String>, rank: i32,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>, deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<MediaRow> for ProductMedia {
    type Error = RepositoryError;
    fn try_from(r: MediaRow) -> Result<Self, Self::Error> {
        let kind = r.kind.parse().map_err(|e: MediaKindError| RepositoryError::Corrupt(e.to_string()))?;
        Ok(ProductMedia { id: r.id, product_id: r.product_id, kind, url: r.url, alt_text: r.alt_text, rank: r.rank, created_at: r.created_at, updated_at: r.updated_at, deleted_at: r.deleted_at })
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid, phone: String, email: Option<String>, first_name: Option<String>, last_name: Option<String>,
    has_account: bool, created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;
    fn try_from(r: CustomerRow) -> Result<Self, Self::Error> {
        let phone = PhoneNumber::parse(&r.phone).map_err(|e| RepositoryError::Corrupt(format!("customer {}: {e}", r.id)))?;
        Ok(Customer { id: r.id, phone, email: r.email, first_name: r.first_name, last_name: r.last_name, has_account: r.has_account, created_at: r.created_at, updated_at: r.updated_at })
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow { id: String, handle: String, title: String, description: Option<String>, thumbnail: Option<String>, status: String, created_at: DateTime<Utc> }

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product { id: r.id, handle: r.handle, title: r.title, description: r.description, thumbnail: r.thumbnail, status: ProductStatus::parse(&r.status), created_at: r.created_at }
    }
}

fn convert<R, T: TryFrom<R, Error = RepositoryError>>(rows: Vec<R>) -> RepoResult<Vec<T>> {
    rows.into_iter().map(T::try_from).collect()
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

const REVIEW_FILTER: &str = "deleted_at IS NULL AND ($1::text IS NULL OR product_id = $1) AND ($2::text IS NULL OR status = $2)";

#[async_trait]
impl ReviewRepository for PgStore {
    async fn save(&self, review: &Review) -> RepoResult<()> {
        let r = review.to_record();
        sqlx::query("INSERT INTO reviews (id, product_id, customer_id, author, rating, title, content, status, created_at, updated_at, deleted_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) ON CONFLICT (id) DO UPDATE SET author = $4, rating = $5, title = $6, content = $7, status = $8, updated_at = $10, deleted_at = $11")
            .bind(r.id).bind(&r.product_id).bind(r.customer_id).bind(&r.author).bind(i16::from(r.rating.value())).bind(&r.title)
            .bind(&r.content).bind(r.status.as_str()).bind(r.created_at).bind(r.updated_at).bind(r.deleted_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Review>> {
        sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE id = $1 AND deleted_at IS NULL").bind(id)
            .fetch_optional(&self.pool).await?.map(Review::try_from).transpose()
    }

    async fn list(&self, f: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!("SELECT * FROM reviews WHERE {REVIEW_FILTER} ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"))
            .bind(&f.product_id).bind(f.status.map(|s| s.as_str())).bind(i64::from(f.limit)).bind(i64::from(f.offset))
            .fetch_all(&self.pool).await?;
        convert(rows)
    }

    async fn count(&self, f: &ReviewFilter) -> RepoResult<u64> {
        let total: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM reviews WHERE {REVIEW_FILTER}"))
            .bind(&f.product_id).bind(f.status.map(|s| s.as_str()))
            .fetch_one(&self.pool).await?;
        Ok(total.0.max(0) as u64)
    }
}

#[async_trait]
impl ProductVideoRepository for PgStore {
    async fn save(&self, v: &ProductVideo) -> RepoResult<()> {
        sqlx::query("INSERT INTO product_videos (id, product_id, url, title, thumbnail_url, rank, created_at, updated_at, deleted_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT (id) DO UPDATE SET url = $3, title = $4, thumbnail_url = $5, rank = $6, updated_at = $8, deleted_at = $9")
            .bind(v.id).bind(&v.product_id).bind(&v.url).bind(&v.title).bind(&v.thumbnail_url).bind(v.rank)
            .bind(v.created_at).bind(v.updated_at).bind(v.deleted_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<ProductVideo>> {
        Ok(sqlx::query_as::<_, ProductVideo>("SELECT * FROM product_videos WHERE id = $1 AND deleted_at IS NULL").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list(&self, product_id: Option<&str>) -> RepoResult<Vec<ProductVideo>> {
        Ok(sqlx::query_as::<_, ProductVideo>("SELECT * FROM product_videos WHERE deleted_at IS NULL AND ($1::text IS NULL OR product_id = $1) ORDER BY rank, created_at")
            .bind(product_id).fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl ProductMediaRepository for PgStore {
    async fn save(&self, m: &ProductMedia) -> RepoResult<()> {
        sqlx::query("INSERT INTO product_media (id, product_id, kind, url, alt_text, rank, created_at, updated_at, deleted_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT (id) DO UPDATE SET kind = $3, url = $4, alt_text = $5, rank = $6, updated_at = $8, deleted_at = $9")
            .bind(m.id).bind(&m.product_id).bind(m.kind.as_str()).bind(&m.url).bind(&m.alt_text).bind(m.rank)
            .bind(m.created_at).bind(m.updated_at).bind(m.deleted_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<ProductMedia>> {
        sqlx::query_as::<_, MediaRow>("SELECT * FROM product_media WHERE id = $1 AND deleted_at IS NULL").bind(id)
            .fetch_optional(&self.pool).await?.map(ProductMedia::try_from).transpose()
    }

    async fn list(&self, product_id: Option<&str>, kind: Option<MediaKind>) -> RepoResult<Vec<ProductMedia>> {
        let rows = sqlx::query_as::<_, MediaRow>("SELECT * FROM product_media WHERE deleted_at IS NULL AND ($1::text IS NULL OR product_id = $1) AND ($2::text IS NULL OR kind = $2) ORDER BY rank, created_at")
            .bind(product_id).bind(kind.map(|k| k.as_str())).fetch_all(&self.pool).await?;
        convert(rows)
    }
}

#[async_trait]
impl BannerRepository for PgStore {
    async fn save(&self, b: &Banner) -> RepoResult<()> {
        sqlx::query("INSERT INTO banners (id, title, subtitle, image_url, link_url, is_active, rank, starts_at, ends_at, created_at, updated_at, deleted_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) ON CONFLICT (id) DO UPDATE SET title = $2, subtitle = $3, image_url = $4, link_url = $5, is_active = $6, rank = $7, starts_at = $8, ends_at = $9, updated_at = $11, deleted_at = $12")
            .bind(b.id).bind(&b.title).bind(&b.subtitle).bind(&b.image_url).bind(&b.link_url).bind(b.is_active).bind(b.rank)
            .bind(b.starts_at).bind(b.ends_at).bind(b.created_at).bind(b.updated_at).bind(b.deleted_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Banner>> {
        Ok(sqlx::query_as::<_, Banner>("SELECT * FROM banners WHERE id = $1 AND deleted_at IS NULL").bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list(&self) -> RepoResult<Vec<Banner>> {
        Ok(sqlx::query_as::<_, Banner>("SELECT * FROM banners WHERE deleted_at IS NULL ORDER BY rank, created_at").fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl CustomerRepository for PgStore {
    async fn save(&self, c: &Customer) -> RepoResult<()> {
        sqlx::query("INSERT INTO customers (id, phone, email, first_name, last_name, has_account, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (id) DO UPDATE SET email = $3, first_name = $4, last_name = $5, has_account = $6, updated_at = $8")
            .bind(c.id).bind(c.phone.as_str()).bind(&c.email).bind(&c.first_name).bind(&c.last_name).bind(c.has_account)
            .bind(c.created_at).bind(c.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_new(&self, c: &Customer) -> RepoResult<bool> {
        let done = sqlx::query("INSERT INTO customers (id, phone, email, first_name, last_name, has_account, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) ON CONFLICT (phone) DO NOTHING")
            .bind(c.id).bind(c.phone.as_str()).bind(&c.email).bind(&c.first_name).bind(&c.last_name).bind(c.has_account)
            .bind(c.created_at).bind(c.updated_at)
            .execute(&self.pool).await?;
        Ok(done.rows_affected() == 1)
    }

    async fn find(&self, id: Uuid) -> RepoResult<Option<Customer>> {
        sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = $1").bind(id)
            .fetch_optional(&self.pool).await?.map(Customer::try_from).transpose()
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> RepoResult<Option<Customer>> {
        sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE phone = $1").bind(phone.as_str())
            .fetch_optional(&self.pool).await?.map(Customer::try_from).transpose()
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn find(&self, id: &str) -> RepoResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT id, handle, title, description, thumbnail, status, created_at FROM products WHERE id = $1 AND deleted_at IS NULL")
            .bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Product::from))
    }

    async fn search(&self, query: &str, limit: u32) -> RepoResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>("SELECT id, handle, title, description, thumbnail, status, created_at FROM products WHERE deleted_at IS NULL AND status = 'published' AND (title ILIKE $1 OR handle ILIKE $1 OR description ILIKE $1) ORDER BY title LIMIT $2")
            .bind(like_pattern(query)).bind(i64::from(limit)).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl RegionRepository for PgStore {
    async fn list(&self) -> RepoResult<Vec<Region>> {
        Ok(sqlx::query_as::<_, Region>("SELECT id, name, currency_code, countries FROM regions WHERE deleted_at IS NULL ORDER BY name").fetch_all(&self.pool).await?)
    }
}
