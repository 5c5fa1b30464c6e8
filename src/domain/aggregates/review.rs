//! Review Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::events::{DomainEvent, ReviewEvent};
use crate::domain::value_objects::Rating;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Pending => "pending", Self::Approved => "approved", Self::Rejected => "rejected" }
    }
}

impl FromStr for ReviewStatus {
    type Err = ReviewError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(ReviewError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Input for a new review, already shaped by the HTTP layer.
#[derive(Clone, Debug)]
pub struct NewReview {
    pub product_id: String,
    pub customer_id: Option<Uuid>,
    pub author: String,
    pub rating: Rating,
    pub title: Option<String>,
    pub content: String,
}

/// Flat persisted form, used to rebuild a review from storage.
#[derive(Clone, Debug)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub product_id: String,
    pub customer_id: Option<Uuid>,
    pub author: String,
    pub rating: Rating,
    pub title: Option<String>,
    pub content: String,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Review {
    id: Uuid,
    product_id: String,
    customer_id: Option<Uuid>,
    author: String,
    rating: Rating,
    title: Option<String>,
    content: String,
    status: ReviewStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    events: Vec<DomainEvent>,
}

impl Review {
    /// Customer submission. Always starts out pending moderation.
    pub fn submit(input: NewReview) -> Result<Self, ReviewError> {
        Self::create(input, ReviewStatus::Pending)
    }

    /// Admin-authored review with an explicit initial status.
    pub fn create(input: NewReview, status: ReviewStatus) -> Result<Self, ReviewError> {
        let author = input.author.trim().to_string();
        let content = input.content.trim().to_string();
        if input.product_id.trim().is_empty() { return Err(ReviewError::MissingProduct); }
        if author.is_empty() { return Err(ReviewError::MissingAuthor); }
        if content.is_empty() { return Err(ReviewError::EmptyContent); }
        let now = Utc::now();
        let mut review = Self {
            id: Uuid::now_v7(), product_id: input.product_id, customer_id: input.customer_id, author,
            rating: input.rating, title: input.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            content, status, created_at: now, updated_at: now, deleted_at: None, events: vec![],
        };
        review.raise_event(DomainEvent::Review(ReviewEvent::Created {
            review_id: review.id, product_id: review.product_id.clone(), rating: review.rating.value(),
        }));
        Ok(review)
    }

    pub fn restore(r: ReviewRecord) -> Self {
        Self {
            id: r.id, product_id: r.product_id, customer_id: r.customer_id, author: r.author, rating: r.rating,
            title: r.title, content: r.content, status: r.status, created_at: r.created_at,
            updated_at: r.updated_at, deleted_at: r.deleted_at, events: vec![],
        }
    }

    pub fn to_record(&self) -> ReviewRecord {
        ReviewRecord {
            id: self.id, product_id: self.product_id.clone(), customer_id: self.customer_id,
            author: self.author.clone(), rating: self.rating, title: self.title.clone(),
            content: self.content.clone(), status: self.status, created_at: self.created_at,
            updated_at: self.updated_at, deleted_at: self.deleted_at,
        }
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn product_id(&self) -> &str { &self.product_id }
    pub fn customer_id(&self) -> Option<Uuid> { self.customer_id }
    pub fn author(&self) -> &str { &self.author }
    pub fn rating(&self) -> Rating { self.rating }
    pub fn title(&self) -> Option<&str> { self.title.as_deref() }
    pub fn content(&self) -> &str { &self.content }
    pub fn status(&self) -> ReviewStatus { self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn is_deleted(&self) -> bool { self.deleted_at.is_some() }

    pub fn approve(&mut self) -> Result<(), ReviewError> {
        self.transition(ReviewStatus::Approved)
    }

    pub fn reject(&mut self) -> Result<(), ReviewError> {
        self.transition(ReviewStatus::Rejected)
    }

    pub fn delete(&mut self) -> Result<(), ReviewError> {
        if self.is_deleted() { return Err(ReviewError::Deleted); }
        self.deleted_at = Some(Utc::now());
        self.touch();
        self.raise_event(DomainEvent::Review(ReviewEvent::Deleted { review_id: self.id, product_id: self.product_id.clone() }));
        Ok(())
    }

    // Re-applying the current status is a no-op and raises nothing.
    fn transition(&mut self, to: ReviewStatus) -> Result<(), ReviewError> {
        if self.is_deleted() { return Err(ReviewError::Deleted); }
        if self.status == to { return Ok(()); }
        self.status = to;
        self.touch();
        let (review_id, product_id) = (self.id, self.product_id.clone());
        let event = match to {
            ReviewStatus::Approved => ReviewEvent::Approved { review_id, product_id },
            ReviewStatus::Rejected => ReviewEvent::Rejected { review_id, product_id },
            ReviewStatus::Pending => return Ok(()),
        };
        self.raise_event(DomainEvent::Review(event));
        Ok(())
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

/// Aggregate rating figures over a set of reviews.
#[derive(Clone, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct RatingSummary {
    pub count: usize,
    /// Mean rating rounded to one decimal, 0 when there are no reviews.
    pub average: f64,
    /// Review counts for 1 through 5 stars.
    pub distribution: Vec<usize>,
}

impl RatingSummary {
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let mut summary = Self { distribution: vec![0; 5], ..Self::default() };
        let mut total = 0u64;
        for r in reviews {
            let v = r.rating().value();
            summary.count += 1;
            summary.distribution[usize::from(v - 1)] += 1;
            total += u64::from(v);
        }
        if summary.count > 0 {
            summary.average = (total as f64 / summary.count as f64 * 10.0).round() / 10.0;
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("product id is required")]
    MissingProduct,
    #[error("author name is required")]
    MissingAuthor,
    #[error("review content must not be empty")]
    EmptyContent,
    #[error("review has been deleted")]
    Deleted,
    #[error("unknown review status '{0}'")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_review(rating: u8) -> NewReview {
        NewReview { product_id: "prod_1".into(), customer_id: None, author: "Anna".into(), rating: Rating::new(rating).unwrap(), title: Some("  ".into()), content: "Great fit".into() }
    }

    #[test]
    fn test_submitted_review_is_pending() {
        let mut r = Review::submit(new_review(4)).unwrap();
        assert_eq!(r.status(), ReviewStatus::Pending);
        assert_eq!(r.title(), None);
        assert!(matches!(r.take_events().as_slice(), [DomainEvent::Review(ReviewEvent::Created { rating: 4, .. })]));
    }

    #[test]
    fn test_moderation_workflow() {
        let mut r = Review::submit(new_review(5)).unwrap();
        r.take_events();
        r.approve().unwrap();
        r.approve().unwrap();
        assert_eq!(r.status(), ReviewStatus::Approved);
        assert_eq!(r.take_events().len(), 1);
        r.reject().unwrap();
        assert_eq!(r.status(), ReviewStatus::Rejected);
        r.delete().unwrap();
        assert_eq!(r.approve(), Err(ReviewError::Deleted));
        assert_eq!(r.delete(), Err(ReviewError::Deleted));
    }

    #[test]
    fn test_validation() {
        let mut input = new_review(3);
        input.content = "   ".into();
        assert_eq!(Review::submit(input).unwrap_err(), ReviewError::EmptyContent);
        let mut input = new_review(3);
        input.author = String::new();
        assert_eq!(Review::submit(input).unwrap_err(), ReviewError::MissingAuthor);
    }

    #[test]
    fn test_rating_summary() {
        let reviews: Vec<Review> = [5, 4, 4].into_iter().map(|v| Review::submit(new_review(v)).unwrap()).collect();
        let s = RatingSummary::from_reviews(&reviews);
        assert_eq!(s.count, 3);
        assert_eq!(s.average, 4.3);
        assert_eq!(s.distribution, vec![0, 0, 0, 2, 1]);
        assert_eq!(RatingSummary::from_reviews(&Vec::<Review>::new()).average, 0.0);
    }

    #[test]
    fn test_record_round_trip_keeps_status() {
        let mut r = Review::submit(new_review(2)).unwrap();
        r.approve().unwrap();
        let restored = Review::restore(r.to_record());
        assert_eq!(restored.status(), ReviewStatus::Approved);
        assert_eq!(restored.id(), r.id());
    }
}
