//! Product read model
//!
//! Products are owned by the commerce catalog; this service only reads them
//! to validate attachments and to answer search queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Proposed,
    Published,
    Rejected,
}

impl ProductStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "published" => Self::Published,
            "proposed" => Self::Proposed,
            "rejected" => Self::Rejected,
            _ => Self::Draft,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_published(&self) -> bool { self.status == ProductStatus::Published }

    /// Case-insensitive substring match on title, handle and description.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        self.title.to_lowercase().contains(&q)
            || self.handle.to_lowercase().contains(&q)
            || self.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        let p = Product {
            id: "prod_1".into(), handle: "linen-shirt".into(), title: "Linen Shirt".into(),
            description: Some("Breathable summer wear".into()), thumbnail: None,
            status: ProductStatus::Published, created_at: Utc::now(),
        };
        assert!(p.matches("shirt"));
        assert!(p.matches("SUMMER"));
        assert!(!p.matches("wool"));
        assert_eq!(ProductStatus::parse("published"), ProductStatus::Published);
    }
}
