//! Product video attachments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::value_objects::is_web_url;
use super::AttachmentError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ProductVideo {
    pub id: Uuid,
    pub product_id: String,
    pub url: String,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub rank: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct ProductVideoChanges {
    pub url: Option<String>,
    pub title: Option<Option<String>>,
    pub thumbnail_url: Option<Option<String>>,
    pub rank: Option<i32>,
}

impl ProductVideo {
    pub fn create(product_id: impl Into<String>, url: impl Into<String>, title: Option<String>, thumbnail_url: Option<String>, rank: i32) -> Result<Self, AttachmentError> {
        let (product_id, url) = (product_id.into(), url.into());
        if product_id.trim().is_empty() { return Err(AttachmentError::MissingProduct); }
        check_url(&url)?;
        if let Some(t) = &thumbnail_url { check_url(t)?; }
        let now = Utc::now();
        Ok(Self { id: Uuid::now_v7(), product_id, url, title, thumbnail_url, rank, created_at: now, updated_at: now, deleted_at: None })
    }

    /// All-or-nothing: a rejected URL leaves the video unchanged.
    pub fn apply(&mut self, changes: ProductVideoChanges) -> Result<(), AttachmentError> {
        if let Some(url) = &changes.url { check_url(url)?; }
        if let Some(Some(t)) = &changes.thumbnail_url { check_url(t)?; }
        if let Some(url) = changes.url { self.url = url; }
        if let Some(t) = changes.thumbnail_url { self.thumbnail_url = t; }
        if let Some(title) = changes.title { self.title = title; }
        if let Some(rank) = changes.rank { self.rank = rank; }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn delete(&mut self) { self.deleted_at = Some(Utc::now()); self.updated_at = Utc::now(); }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
}

fn check_url(url: &str) -> Result<(), AttachmentError> {
    if is_web_url(url) { Ok(()) } else { Err(AttachmentError::InvalidUrl(url.to_string())) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_update() {
        let mut v = ProductVideo::create("prod_1", "https://youtu.be/x", None, None, 0).unwrap();
        v.apply(ProductVideoChanges { rank: Some(3), title: Some(Some("Unboxing".into())), ..Default::default() }).unwrap();
        assert_eq!(v.rank, 3);
        assert_eq!(v.title.as_deref(), Some("Unboxing"));
        assert!(v.apply(ProductVideoChanges { url: Some("not a url".into()), ..Default::default() }).is_err());
        assert_eq!(v.url, "https://youtu.be/x");
    }

    #[test]
    fn test_nullable_fields_can_be_cleared() {
        let mut v = ProductVideo::create("prod_1", "https://youtu.be/x", Some("Intro".into()), Some("https://cdn.example.com/t.jpg".into()), 0).unwrap();
        v.apply(ProductVideoChanges { rank: Some(1), ..Default::default() }).unwrap();
        assert_eq!(v.title.as_deref(), Some("Intro"), "absent field is kept");
        v.apply(ProductVideoChanges { title: Some(None), thumbnail_url: Some(None), ..Default::default() }).unwrap();
        assert_eq!(v.title, None);
        assert_eq!(v.thumbnail_url, None);
    }

    #[test]
    fn test_rejected_update_changes_nothing() {
        let mut v = ProductVideo::create("prod_1", "https://youtu.be/x", None, None, 0).unwrap();
        let changes = ProductVideoChanges { url: Some("https://youtu.be/y".into()), thumbnail_url: Some(Some("thumb.png".into())), ..Default::default() };
        assert!(v.apply(changes).is_err());
        assert_eq!(v.url, "https://youtu.be/x");
    }

    #[test]
    fn test_rejects_bad_thumbnail() {
        assert_eq!(
            ProductVideo::create("prod_1", "https://youtu.be/x", None, Some("thumb.png".into()), 0).unwrap_err(),
            AttachmentError::InvalidUrl("thumb.png".into())
        );
    }
}
