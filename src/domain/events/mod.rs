//! Domain events
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Review(ReviewEvent),
    Customer(CustomerEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEvent {
    Created { review_id: Uuid, product_id: String, rating: u8 },
    Approved { review_id: Uuid, product_id: String },
    Rejected { review_id: Uuid, product_id: String },
    Deleted { review_id: Uuid, product_id: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomerEvent {
    Registered { customer_id: Uuid, phone: String },
}

impl DomainEvent {
    /// Messaging subject, `storefront.<aggregate>.<event>`.
    pub fn subject(&self) -> String {
        let (aggregate, name) = match self {
            Self::Review(ReviewEvent::Created { .. }) => ("review", "created"),
            Self::Review(ReviewEvent::Approved { .. }) => ("review", "approved"),
            Self::Review(ReviewEvent::Rejected { .. }) => ("review", "rejected"),
            Self::Review(ReviewEvent::Deleted { .. }) => ("review", "deleted"),
            Self::Customer(CustomerEvent::Registered { .. }) => ("customer", "registered"),
        };
        format!("storefront.{aggregate}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_and_payload() {
        let e = DomainEvent::Review(ReviewEvent::Approved { review_id: Uuid::nil(), product_id: "prod_1".into() });
        assert_eq!(e.subject(), "storefront.review.approved");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "approved");
        assert_eq!(json["product_id"], "prod_1");
    }
}
