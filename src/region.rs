//! Country-code routing for storefront paths.
//!
//! [`RegionCache`] keeps a country-code → region map, refreshed from the
//! region repository at most once per refresh interval. The
//! [`storefront_region`] middleware makes sure every storefront URL starts
//! with a known country code and that the visitor carries a cache-id cookie.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::aggregates::Region;
use crate::domain::value_objects::CountryCode;
use crate::repository::RegionRepository;

pub const CACHE_ID_COOKIE: &str = "_medusa_cache_id";
const CACHE_ID_MAX_AGE_SECS: u64 = 24 * 3600;

/// Path prefixes served by the API itself, never rewritten.
const API_PREFIXES: &[&str] = &["/store", "/admin", "/api", "/doc", "/health"];

pub type RegionMap = HashMap<String, Region>;

struct Snapshot {
    map: Arc<RegionMap>,
    loaded_at: Option<Instant>,
}

pub struct RegionCache {
    source: Arc<dyn RegionRepository>,
    refresh_every: Duration,
    snapshot: RwLock<Snapshot>,
    refreshing: Mutex<()>,
}

impl RegionCache {
    pub fn new(source: Arc<dyn RegionRepository>, refresh_every: Duration) -> Self {
        Self {
            source,
            refresh_every,
            snapshot: RwLock::new(Snapshot { map: Arc::new(HashMap::new()), loaded_at: None }),
            refreshing: Mutex::new(()),
        }
    }

    fn is_fresh(&self, s: &Snapshot) -> bool {
        s.loaded_at.is_some_and(|at| at.elapsed() < self.refresh_every) && !s.map.is_empty()
    }

    /// Current map, reloading first when stale. A failed reload keeps the
    /// previous map.
    pub async fn regions(&self) -> Arc<RegionMap> {
        {
            let s = self.snapshot.read().await;
            if self.is_fresh(&s) { return s.map.clone(); }
        }
        let _guard = self.refreshing.lock().await;
        {
            let s = self.snapshot.read().await;
            if self.is_fresh(&s) { return s.map.clone(); }
        }
        match self.source.list().await {
            Ok(regions) => {
                let map = Arc::new(index_by_country(regions));
                tracing::debug!(countries = map.len(), "region map refreshed");
                let mut s = self.snapshot.write().await;
                *s = Snapshot { map: map.clone(), loaded_at: Some(Instant::now()) };
                map
            }
            Err(e) => {
                tracing::warn!(error = %e, "region refresh failed; serving previous map");
                self.snapshot.read().await.map.clone()
            }
        }
    }

    /// Marks the map stale so the next read reloads it.
    pub async fn invalidate(&self) {
        self.snapshot.write().await.loaded_at = None;
    }
}

fn index_by_country(regions: Vec<Region>) -> RegionMap {
    let mut map = HashMap::new();
    for region in regions {
        for country in &region.countries {
            map.insert(country.to_lowercase(), region.clone());
        }
    }
    map
}

/// Effective country: URL segment, then geo header, then the default, then
/// the alphabetically first known country.
pub fn resolve_country_code(map: &RegionMap, path_segment: Option<&str>, geo_country: Option<&str>, default: &str) -> Option<String> {
    let known = |c: &str| CountryCode::new(c).ok().map(|c| c.as_str().to_string()).filter(|c| map.contains_key(c));
    path_segment.and_then(known)
        .or_else(|| geo_country.and_then(known))
        .or_else(|| known(default))
        .or_else(|| map.keys().min().cloned())
}

fn first_segment(path: &str) -> Option<&str> {
    path.trim_start_matches('/').split('/').next().filter(|s| !s.is_empty())
}

fn is_api_path(path: &str) -> bool {
    API_PREFIXES.iter().any(|p| path == *p || path.starts_with(&format!("{p}/")))
}

fn has_cache_id(headers: &HeaderMap) -> bool {
    headers.get_all(header::COOKIE).iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == CACHE_ID_COOKIE && !value.is_empty())
}

fn redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(v) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, v)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query().map(|pq| pq.as_str().to_string()).unwrap_or_else(|| uri.path().to_string())
}

/// Storefront routing guard; API paths pass straight through.
pub async fn storefront_region(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if is_api_path(&path) { return next.run(req).await; }

    let regions = state.regions.cache.regions().await;
    if regions.is_empty() {
        tracing::warn!(path = %path, "no regions available; skipping country routing");
        return next.run(req).await;
    }

    let segment = first_segment(&path);
    let geo = req.headers().get(state.regions.geo_header.as_str()).and_then(|v| v.to_str().ok());
    let Some(country) = resolve_country_code(&regions, segment, geo, &state.regions.default_country) else {
        return next.run(req).await;
    };
    let url_has_country = segment.is_some_and(|s| s.eq_ignore_ascii_case(&country));

    if url_has_country {
        if has_cache_id(req.headers()) { return next.run(req).await; }
        let mut res = redirect(&path_and_query(req.uri()));
        let cookie = format!("{CACHE_ID_COOKIE}={}; Max-Age={CACHE_ID_MAX_AGE_SECS}; Path=/", Uuid::new_v4());
        if let Ok(v) = HeaderValue::from_str(&cookie) { res.headers_mut().insert(header::SET_COOKIE, v); }
        return res;
    }

    // Static assets are left alone.
    if path.rsplit('/').next().is_some_and(|last| last.contains('.')) { return next.run(req).await; }

    // "/" becomes "/<cc>/".
    let query = req.uri().query().map(|q| format!("?{q}")).unwrap_or_default();
    redirect(&format!("/{country}{path}{query}"))
}

/// Settings and cache used by the storefront routing middleware.
pub struct RegionRouting {
    pub cache: RegionCache,
    pub default_country: String,
    pub geo_header: String,
}

#[derive(Serialize, ToSchema)]
pub struct StorefrontContext {
    pub country_code: String,
    pub region: Region,
    pub path: String,
}

/// Fallback for storefront paths that passed the middleware: the region the
/// page would be rendered for.
pub async fn storefront_context(State(state): State<AppState>, uri: Uri) -> Response {
    let regions = state.regions.cache.regions().await;
    let path = uri.path().to_string();
    match first_segment(&path).map(str::to_lowercase).and_then(|c| regions.get(&c).map(|r| (c, r.clone()))) {
        Some((country_code, region)) => Json(StorefrontContext { country_code, region, path }).into_response(),
        None => crate::error::ApiError::NotFound("page").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    fn region(id: &str, countries: &[&str]) -> Region {
        Region { id: id.into(), name: id.into(), currency_code: "eur".into(), countries: countries.iter().map(|c| c.to_string()).collect() }
    }

    fn map() -> RegionMap { index_by_country(vec![region("eu", &["de", "fr"]), region("na", &["us"])]) }

    #[test]
    fn test_resolution_order() {
        let m = map();
        assert_eq!(resolve_country_code(&m, Some("FR"), Some("us"), "us").as_deref(), Some("fr"));
        assert_eq!(resolve_country_code(&m, Some("products"), Some("DE"), "us").as_deref(), Some("de"));
        assert_eq!(resolve_country_code(&m, None, Some("jp"), "us").as_deref(), Some("us"));
        assert_eq!(resolve_country_code(&m, None, None, "jp").as_deref(), Some("de"));
        assert_eq!(resolve_country_code(&HashMap::new(), None, None, "us"), None);
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(first_segment("/de/products/x"), Some("de"));
        assert_eq!(first_segment("/"), None);
        assert!(is_api_path("/store/reviews"));
        assert!(is_api_path("/health"));
        assert!(!is_api_path("/storefront"));
    }

    #[test]
    fn test_cache_id_cookie_detection() {
        let mut h = HeaderMap::new();
        h.insert(header::COOKIE, HeaderValue::from_static("theme=dark; _medusa_cache_id=abc"));
        assert!(has_cache_id(&h));
        h.insert(header::COOKIE, HeaderValue::from_static("_medusa_cache_id="));
        assert!(!has_cache_id(&h));
    }

    #[tokio::test]
    async fn test_cache_refreshes_only_when_stale() {
        let store = Arc::new(InMemoryStore::new().with_regions([region("na", &["us"])]));
        let cache = RegionCache::new(store.clone(), Duration::from_secs(3600));
        assert!(cache.regions().await.contains_key("us"));

        store.replace_regions([region("eu", &["de"])]);
        assert!(cache.regions().await.contains_key("us"), "fresh map is reused");

        cache.invalidate().await;
        let m = cache.regions().await;
        assert!(m.contains_key("de"));
        assert!(!m.contains_key("us"));
    }
}
