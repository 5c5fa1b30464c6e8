//! Product media (images and videos) attached to a product

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::value_objects::{is_web_url, MediaKind};
use super::AttachmentError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductMedia {
    pub id: Uuid,
    pub product_id: String,
    pub kind: MediaKind,
    pub url: String,
    pub alt_text: Option<String>,
    pub rank: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct ProductMediaChanges {
    pub kind: Option<MediaKind>,
    pub url: Option<String>,
    pub alt_text: Option<Option<String>>,
    pub rank: Option<i32>,
}

impl ProductMedia {
    pub fn create(product_id: impl Into<String>, kind: MediaKind, url: impl Into<String>, alt_text: Option<String>, rank: i32) -> Result<Self, AttachmentError> {
        let (product_id, url) = (product_id.into(), url.into());
        if product_id.trim().is_empty() { return Err(AttachmentError::MissingProduct); }
        if !is_web_url(&url) { return Err(AttachmentError::InvalidUrl(url)); }
        let now = Utc::now();
        Ok(Self { id: Uuid::now_v7(), product_id, kind, url, alt_text, rank, created_at: now, updated_at: now, deleted_at: None })
    }

    pub fn apply(&mut self, changes: ProductMediaChanges) -> Result<(), AttachmentError> {
        if let Some(url) = changes.url {
            if !is_web_url(&url) { return Err(AttachmentError::InvalidUrl(url)); }
            self.url = url;
        }
        if let Some(kind) = changes.kind { self.kind = kind; }
        if let Some(alt) = changes.alt_text { self.alt_text = alt; }
        if let Some(rank) = changes.rank { self.rank = rank; }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn delete(&mut self) { self.deleted_at = Some(Utc::now()); self.updated_at = Utc::now(); }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }
}
