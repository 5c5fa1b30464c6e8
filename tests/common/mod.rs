#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use storefront_services::auth::JwtIssuer;
use storefront_services::cache::InMemoryCache;
use storefront_services::config::OtpConfig;
use storefront_services::domain::aggregates::{Product, ProductStatus, Region};
use storefront_services::domain::value_objects::PhoneNumber;
use storefront_services::publisher::EventPublisher;
use storefront_services::region::{RegionCache, RegionRouting};
use storefront_services::repository::{InMemoryStore, Repositories};
use storefront_services::sms::{SmsError, SmsSender};
use storefront_services::verification::VerificationService;
use storefront_services::{api, router, AppState, CorsOrigins};

pub const ADMIN_KEY: &str = "admin-test-key";

/// Records outgoing SMS instead of sending them.
#[derive(Default)]
pub struct Outbox(pub Mutex<Vec<(String, String)>>);

impl Outbox {
    /// Digits of the last code sent to `phone`.
    pub fn last_code(&self, phone: &str) -> Option<String> {
        self.0.lock().unwrap().iter().rev().find(|(to, _)| to == phone)
            .map(|(_, msg)| msg.chars().skip_while(|c| !c.is_ascii_digit()).take_while(|c| c.is_ascii_digit()).collect())
    }
}

#[async_trait]
impl SmsSender for Outbox {
    async fn send(&self, to: &PhoneNumber, message: &str) -> Result<(), SmsError> {
        self.0.lock().unwrap().push((to.to_string(), message.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub outbox: Arc<Outbox>,
}

pub fn product(id: &str, title: &str, status: ProductStatus) -> Product {
    Product { id: id.into(), handle: title.to_lowercase().replace(' ', "-"), title: title.into(), description: None, thumbnail: None, status, created_at: Utc::now() }
}

pub fn region(id: &str, countries: &[&str]) -> Region {
    Region { id: id.into(), name: id.to_uppercase(), currency_code: "usd".into(), countries: countries.iter().map(|c| c.to_string()).collect() }
}

impl TestApp {
    pub fn new() -> Self { Self::with_regions(vec![region("na", &["us", "ca"]), region("eu", &["de", "fr"])]) }

    pub fn with_regions(regions: Vec<Region>) -> Self { Self::build(regions, |_, _| {}) }

    /// Lets a test swap repositories before the router is built.
    pub fn build(regions: Vec<Region>, customize: impl FnOnce(&mut Repositories, &Arc<InMemoryStore>)) -> Self {
        let store = Arc::new(
            InMemoryStore::new()
                .with_products([
                    product("prod_shirt", "Linen Shirt", ProductStatus::Published),
                    product("prod_pants", "Linen Pants", ProductStatus::Published),
                    product("prod_draft", "Linen Hat", ProductStatus::Draft),
                ])
                .with_regions(regions),
        );
        let mut repos = Repositories::from_store(store.clone());
        customize(&mut repos, &store);
        let outbox = Arc::new(Outbox::default());
        let cache = Arc::new(InMemoryCache::new());
        let state = AppState {
            verification: Arc::new(VerificationService::new(cache.clone(), outbox.clone(), OtpConfig::default())),
            jwt: Arc::new(JwtIssuer::new("test-secret", Duration::from_secs(3600))),
            regions: Arc::new(RegionRouting {
                cache: RegionCache::new(repos.regions.clone(), Duration::from_secs(3600)),
                default_country: "us".into(),
                geo_header: "x-vercel-ip-country".into(),
            }),
            events: EventPublisher::disabled(),
            admin_api_key: Some(ADMIN_KEY.into()),
            openapi: Arc::new(api::openapi::document(None)),
            repos,
            cache,
        };
        Self { router: router(state, &CorsOrigins::default()), store, outbox }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> (u16, Value) {
        json_of(self.send(Request::get(uri).body(Body::empty()).unwrap()).await).await
    }

    pub async fn delete(&self, uri: &str) -> (u16, Value) {
        json_of(self.send(Request::delete(uri).body(Body::empty()).unwrap()).await).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (u16, Value) {
        json_of(self.send(json_request("POST", uri, body, None)).await).await
    }

    pub async fn admin(&self, method: &str, uri: &str, body: Option<Value>) -> (u16, Value) {
        let req = match body {
            Some(b) => json_request(method, uri, b, Some(ADMIN_KEY)),
            None => Request::builder().method(method).uri(uri).header("x-api-key", ADMIN_KEY).body(Body::empty()).unwrap(),
        };
        json_of(self.send(req).await).await
    }
}

pub fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    if let Some(token) = bearer { builder = builder.header("authorization", format!("Bearer {token}")); }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn json_of(res: Response<Body>) -> (u16, Value) {
    let status = res.status().as_u16();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
