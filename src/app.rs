//! Shared application state and the HTTP router.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use serde_json::Value;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, banners, cache_demo, customers, media, openapi, otp, regions, reviews, search, sms_auth, videos};
use crate::auth::{require_admin, require_customer, JwtIssuer};
use crate::cache::CacheService;
use crate::publisher::EventPublisher;
use crate::region::{self, RegionRouting};
use crate::repository::Repositories;
use crate::verification::VerificationService;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub cache: Arc<dyn CacheService>,
    pub verification: Arc<VerificationService>,
    pub jwt: Arc<JwtIssuer>,
    pub regions: Arc<RegionRouting>,
    pub events: EventPublisher,
    pub admin_api_key: Option<String>,
    pub openapi: Arc<Value>,
}

/// Allowed browser origins per route group. Empty means any origin.
#[derive(Clone, Debug, Default)]
pub struct CorsOrigins {
    pub store: Vec<String>,
    pub admin: Vec<String>,
}

fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() { return layer.allow_origin(Any); }
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| match HeaderValue::from_str(o) {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(origin = %o, "ignoring malformed CORS origin");
            None
        }
    }).collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

pub fn router(state: AppState, origins: &CorsOrigins) -> Router {
    let store = Router::new()
        .route("/products/:id/reviews", get(reviews::list_for_product))
        .route("/products/:id/videos", get(videos::list_for_product))
        .route("/products/:id/media", get(media::list_for_product))
        .route("/reviews", post(reviews::create))
        .route("/banners", get(banners::list_visible))
        .route("/search", get(search::search))
        .route("/regions", get(regions::list))
        .route("/cache-demo", get(cache_demo::get).delete(cache_demo::clear))
        .route("/otp/send", post(otp::send))
        .route("/otp/verify", post(otp::verify))
        .route("/auth/sms/send", post(sms_auth::send))
        .route("/auth/sms/verify", post(sms_auth::verify))
        .route("/customers/me", get(customers::me).route_layer(from_fn_with_state(state.clone(), require_customer)))
        .layer(cors(&origins.store));

    let admin = Router::new()
        .route("/reviews", get(reviews::admin_list).post(reviews::admin_create))
        .route("/reviews/:id", get(reviews::admin_get).delete(reviews::admin_delete))
        .route("/reviews/:id/approve", post(reviews::approve))
        .route("/reviews/:id/reject", post(reviews::reject))
        .route("/product-videos", get(videos::admin_list).post(videos::admin_create))
        .route("/product-videos/:id", get(videos::admin_get).put(videos::admin_update).delete(videos::admin_delete))
        .route("/product-media", get(media::admin_list).post(media::admin_create))
        .route("/product-media/:id", get(media::admin_get).put(media::admin_update).delete(media::admin_delete))
        .route("/banners", get(banners::admin_list).post(banners::admin_create))
        .route("/banners/:id", get(banners::admin_get).put(banners::admin_update).delete(banners::admin_delete))
        .route_layer(from_fn_with_state(state.clone(), require_admin))
        .layer(cors(&origins.admin));

    Router::new()
        .route("/health", get(api::health))
        .route("/api/swagger.json", get(openapi::swagger_json))
        .route("/doc", get(openapi::swagger_ui))
        .nest("/store", store)
        .nest("/admin", admin)
        .fallback(region::storefront_context)
        .layer(from_fn_with_state(state.clone(), region::storefront_region))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
