//! Storefront Services
//!
//! Extension services for an online store, run next to the commerce core.
//!
//! ## Features
//! - Product reviews with admin moderation
//! - Product videos, media attachments and banners
//! - Cached product search
//! - Phone login with one-time SMS codes
//! - Country-code routing for storefront URLs

pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod publisher;
pub mod region;
pub mod repository;
pub mod sms;
pub mod telemetry;
pub mod verification;

pub use app::{router, AppState, CorsOrigins};
pub use config::Config;
pub use error::ApiError;
