//! Storefront Services - commerce extension API

use std::sync::Arc;

use anyhow::{Context, Result};
use storefront_services::auth::JwtIssuer;
use storefront_services::cache::{CacheService, InMemoryCache, RedisCache};
use storefront_services::publisher::EventPublisher;
use storefront_services::region::{RegionCache, RegionRouting};
use storefront_services::repository::{InMemoryStore, PgStore, Repositories};
use storefront_services::sms::{LogSmsSender, SmsSender, SmscClient};
use storefront_services::verification::VerificationService;
use storefront_services::{api, router, telemetry, AppState, Config, CorsOrigins};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();
    let config = Config::from_env()?;

    let repos = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.context("connecting to PostgreSQL")?;
            store.migrate().await.context("running migrations")?;
            Repositories::from_store(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory repositories");
            Repositories::from_store(Arc::new(InMemoryStore::new()))
        }
    };

    let cache: Arc<dyn CacheService> = match &config.redis_url {
        Some(url) => Arc::new(RedisCache::connect(url, config.cache_namespace.clone()).await.context("connecting to Redis")?),
        None => {
            tracing::info!(sweep_secs = config.cache_sweep_interval.as_secs(), "using in-memory cache");
            Arc::new(InMemoryCache::with_sweep(config.cache_sweep_interval))
        }
    };

    let sms: Arc<dyn SmsSender> = match config.smsc.clone() {
        Some(smsc) => Arc::new(SmscClient::new(smsc).context("building SMSC client")?),
        None => {
            tracing::warn!("SMSC credentials not set; SMS messages are only logged");
            Arc::new(LogSmsSender)
        }
    };

    let state = AppState {
        verification: Arc::new(VerificationService::new(cache.clone(), sms, config.otp.clone())),
        jwt: Arc::new(JwtIssuer::new(&config.jwt_secret, config.jwt_ttl)),
        regions: Arc::new(RegionRouting {
            cache: RegionCache::new(repos.regions.clone(), config.region_refresh_interval),
            default_country: config.default_region.clone(),
            geo_header: config.geo_country_header.clone(),
        }),
        events: EventPublisher::connect(config.nats_url.as_deref()).await,
        admin_api_key: config.admin_api_key.clone(),
        openapi: Arc::new(api::openapi::document(config.swagger_static_path.as_deref())),
        repos,
        cache,
    };
    if state.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY not set; admin routes are unauthenticated");
    }

    let app = router(state, &CorsOrigins { store: config.store_cors.clone(), admin: config.admin_cors.clone() });
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("storefront services listening on 0.0.0.0:{}", config.port);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => { sig.recv().await; }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
