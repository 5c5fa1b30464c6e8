//! Aggregates module
pub mod banner;
pub mod customer;
pub mod product;
pub mod product_media;
pub mod product_video;
pub mod region;
pub mod review;

pub use banner::{Banner, BannerChanges, BannerDraft, BannerError};
pub use customer::{Customer, CustomerProfile};
pub use product::{Product, ProductStatus};
pub use product_media::{ProductMedia, ProductMediaChanges};
pub use product_video::{ProductVideo, ProductVideoChanges};
pub use region::Region;
pub use review::{NewReview, RatingSummary, Review, ReviewError, ReviewRecord, ReviewStatus};

use thiserror::Error;

/// Validation failures shared by product attachments (videos, media).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    #[error("product id is required")]
    MissingProduct,
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
}
