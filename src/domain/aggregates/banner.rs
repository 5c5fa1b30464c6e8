//! Storefront banners

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::value_objects::is_web_url;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub rank: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
pub struct BannerDraft {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub rank: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default)]
/// `None` keeps a field; `Some(None)` clears a nullable one.
pub struct BannerChanges {
    pub title: Option<String>,
    pub subtitle: Option<Option<String>>,
    pub image_url: Option<String>,
    pub link_url: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub rank: Option<i32>,
    pub starts_at: Option<Option<DateTime<Utc>>>,
    pub ends_at: Option<Option<DateTime<Utc>>>,
}

impl Banner {
    pub fn create(d: BannerDraft) -> Result<Self, BannerError> {
        let now = Utc::now();
        let banner = Self {
            id: Uuid::now_v7(), title: d.title.trim().to_string(), subtitle: d.subtitle, image_url: d.image_url,
            link_url: d.link_url, is_active: d.is_active, rank: d.rank, starts_at: d.starts_at, ends_at: d.ends_at,
            created_at: now, updated_at: now, deleted_at: None,
        };
        banner.validate()?;
        Ok(banner)
    }

    pub fn apply(&mut self, c: BannerChanges) -> Result<(), BannerError> {
        let mut next = self.clone();
        if let Some(v) = c.title { next.title = v.trim().to_string(); }
        if let Some(v) = c.subtitle { next.subtitle = v; }
        if let Some(v) = c.image_url { next.image_url = v; }
        if let Some(v) = c.link_url { next.link_url = v; }
        if let Some(v) = c.is_active { next.is_active = v; }
        if let Some(v) = c.rank { next.rank = v; }
        if let Some(v) = c.starts_at { next.starts_at = v; }
        if let Some(v) = c.ends_at { next.ends_at = v; }
        next.validate()?;
        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }

    pub fn delete(&mut self) { self.deleted_at = Some(Utc::now()); self.updated_at = Utc::now(); }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

    /// Active, not deleted, and inside its schedule window (bounds inclusive).
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && !self.is_deleted()
            && self.starts_at.map_or(true, |s| s <= now)
            && self.ends_at.map_or(true, |e| now <= e)
    }

    fn validate(&self) -> Result<(), BannerError> {
        if self.title.is_empty() { return Err(BannerError::MissingTitle); }
        if !is_web_url(&self.image_url) { return Err(BannerError::InvalidUrl(self.image_url.clone())); }
        // Links may be storefront-relative.
        if let Some(link) = &self.link_url {
            if !link.starts_with('/') && !is_web_url(link) { return Err(BannerError::InvalidUrl(link.clone())); }
        }
        if let (Some(s), Some(e)) = (self.starts_at, self.ends_at) {
            if e < s { return Err(BannerError::InvalidSchedule); }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BannerError {
    #[error("banner title is required")]
    MissingTitle,
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
    #[error("banner ends before it starts")]
    InvalidSchedule,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> BannerDraft {
        BannerDraft { title: "Summer sale".into(), image_url: "https://cdn.example.com/b.jpg".into(), link_url: Some("/us/sale".into()), is_active: true, ..Default::default() }
    }

    #[test]
    fn test_visibility_window() {
        let now = Utc::now();
        let mut b = Banner::create(BannerDraft { starts_at: Some(now - Duration::hours(1)), ends_at: Some(now + Duration::hours(1)), ..draft() }).unwrap();
        assert!(b.is_visible_at(now));
        assert!(!b.is_visible_at(now + Duration::hours(2)));
        b.apply(BannerChanges { is_active: Some(false), ..Default::default() }).unwrap();
        assert!(!b.is_visible_at(now));
    }

    #[test]
    fn test_invalid_changes_leave_banner_untouched() {
        let now = Utc::now();
        let mut b = Banner::create(draft()).unwrap();
        let err = b.apply(BannerChanges { starts_at: Some(Some(now)), ends_at: Some(Some(now - Duration::days(1))), ..Default::default() }).unwrap_err();
        assert_eq!(err, BannerError::InvalidSchedule);
        assert_eq!(b.starts_at, None);
        assert_eq!(Banner::create(BannerDraft { title: " ".into(), ..draft() }).unwrap_err(), BannerError::MissingTitle);
    }

    #[test]
    fn test_clearing_schedule_and_link() {
        let now = Utc::now();
        let mut b = Banner::create(BannerDraft { subtitle: Some("Up to 50%".into()), ends_at: Some(now - Duration::hours(1)), ..draft() }).unwrap();
        assert!(!b.is_visible_at(now));
        b.apply(BannerChanges { ends_at: Some(None), link_url: Some(None), subtitle: Some(None), ..Default::default() }).unwrap();
        assert!(b.is_visible_at(now));
        assert_eq!(b.link_url, None);
        assert_eq!(b.subtitle, None);
    }
}
