//! Customer Aggregate (phone-authenticated shoppers)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::events::{CustomerEvent, DomainEvent};
use crate::domain::value_objects::PhoneNumber;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub phone: PhoneNumber,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub has_account: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default)]
pub struct CustomerProfile {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Customer {
    /// Registers a phone-verified customer, returning the registration event.
    pub fn register(phone: PhoneNumber, profile: CustomerProfile) -> (Self, DomainEvent) {
        let now = Utc::now();
        let customer = Self {
            id: Uuid::now_v7(), phone, email: profile.email, first_name: profile.first_name,
            last_name: profile.last_name, has_account: true, created_at: now, updated_at: now,
        };
        let event = DomainEvent::Customer(CustomerEvent::Registered { customer_id: customer.id, phone: customer.phone.to_string() });
        (customer, event)
    }

    /// Fills in profile fields that are still empty; returns whether anything changed.
    pub fn complete_profile(&mut self, profile: CustomerProfile) -> bool {
        let mut changed = false;
        for (slot, value) in [(&mut self.email, profile.email), (&mut self.first_name, profile.first_name), (&mut self.last_name, profile.last_name)] {
            if slot.is_none() && value.is_some() { *slot = value; changed = true; }
        }
        if !self.has_account { self.has_account = true; changed = true; }
        if changed { self.updated_at = Utc::now(); }
        changed
    }

    pub fn display_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(n), None) | (None, Some(n)) => Some(n.clone()),
            (None, None) => None,
        }
    }
}
