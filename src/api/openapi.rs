//! OpenAPI document for the extension routes, optionally merged with a
//! hand-written YAML document, plus a Swagger UI page.

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde_json::Value;
use utoipa::OpenApi;

use crate::app::AppState;
use crate::domain::aggregates::{Banner, Customer, Product, ProductMedia, ProductVideo, RatingSummary, Region, Review, ReviewStatus};
use crate::region::StorefrontContext;
use super::banners::{BannerListResponse, CreateBannerRequest, UpdateBannerRequest};
use super::cache_demo::DemoResponse;
use super::media::{CreateMediaRequest, MediaListResponse, UpdateMediaRequest};
use super::otp::{SendCodeRequest, SendCodeResponse, VerifyCodeRequest, VerifyCodeResponse};
use super::regions::RegionListResponse;
use super::reviews::{AdminCreateReviewRequest, CreateReviewRequest, ProductReviewsResponse, ReviewListResponse};
use super::search::SearchResponse;
use super::sms_auth::{SmsSendRequest, SmsSendResponse, SmsVerifyRequest, SmsVerifyResponse};
use super::videos::{CreateVideoRequest, UpdateVideoRequest, VideoListResponse};
use super::DeleteResponse;

#[derive(OpenApi)]
#[openapi(
    info(title = "Storefront Services API", description = "Reviews, product videos and media, banners, search, phone login and regions"),
    tags(
        (name = "store", description = "Public storefront APIs"),
        (name = "auth", description = "OTP and SMS login"),
        (name = "admin", description = "Back-office APIs, API key required")
    ),
    paths(
        paths::product_reviews, paths::create_review, paths::product_videos, paths::product_media,
        paths::banners, paths::search, paths::regions, paths::cache_demo,
        paths::otp_send, paths::otp_verify, paths::sms_send, paths::sms_verify, paths::customer_me,
        paths::admin_reviews, paths::admin_create_review, paths::admin_review, paths::admin_delete_review,
        paths::admin_approve_review, paths::admin_reject_review,
        paths::admin_videos, paths::admin_create_video, paths::admin_update_video, paths::admin_delete_video,
        paths::admin_media, paths::admin_create_media, paths::admin_update_media, paths::admin_delete_media,
        paths::admin_banners, paths::admin_create_banner, paths::admin_update_banner, paths::admin_delete_banner,
    ),
    components(schemas(
        Review, ReviewStatus, RatingSummary, ProductVideo, ProductMedia, Banner, Customer, Product, Region,
        StorefrontContext, DeleteResponse,
    ))
)]
pub struct ApiDoc;

/// Generated document merged with the YAML at `static_path`, if readable.
pub fn document(static_path: Option<&str>) -> Value {
    let mut doc = ApiDoc::openapi();
    if let Some(path) = static_path {
        match std::fs::read_to_string(path).map_err(|e| e.to_string())
            .and_then(|raw| serde_yaml::from_str::<utoipa::openapi::OpenApi>(&raw).map_err(|e| e.to_string()))
        {
            Ok(extra) => doc.merge(extra),
            Err(e) => tracing::warn!(path, error = %e, "static OpenAPI document ignored"),
        }
    }
    serde_json::to_value(&doc).unwrap_or_else(|e| {
        tracing::error!(error = %e, "OpenAPI document not serializable");
        Value::Null
    })
}

pub async fn swagger_json(State(s): State<AppState>) -> Json<Value> {
    Json(s.openapi.as_ref().clone())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_PAGE)
}

const SWAGGER_PAGE: &str = r##"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <title>Storefront Services API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>window.ui = SwaggerUIBundle({ url: "/api/swagger.json", dom_id: "#swagger-ui" });</script>
</body>
</html>
"##;

// Path operation definitions
mod paths {
    use super::*;

    #[utoipa::path(get, path = "/store/products/{id}/reviews", tag = "store",
        params(("id" = String, Path, description = "Product id"), ("limit" = Option<u32>, Query), ("offset" = Option<u32>, Query)),
        responses((status = 200, description = "Approved reviews and rating summary", body = ProductReviewsResponse)))]
    pub async fn product_reviews() {}

    #[utoipa::path(post, path = "/store/reviews", tag = "store", request_body = CreateReviewRequest,
        responses((status = 201, description = "Review submitted for moderation", body = Review), (status = 400, description = "Invalid request"), (status = 404, description = "Unknown product")))]
    pub async fn create_review() {}

    #[utoipa::path(get, path = "/store/products/{id}/videos", tag = "store",
        params(("id" = String, Path, description = "Product id")),
        responses((status = 200, description = "OK", body = VideoListResponse)))]
    pub async fn product_videos() {}

    #[utoipa::path(get, path = "/store/products/{id}/media", tag = "store",
        params(("id" = String, Path, description = "Product id"), ("kind" = Option<String>, Query, description = "image or video")),
        responses((status = 200, description = "OK", body = MediaListResponse), (status = 400, description = "Invalid request")))]
    pub async fn product_media() {}

    #[utoipa::path(get, path = "/store/banners", tag = "store",
        responses((status = 200, description = "Banners visible now", body = BannerListResponse)))]
    pub async fn banners() {}

    #[utoipa::path(get, path = "/store/search", tag = "store",
        params(("q" = String, Query, description = "Search text"), ("limit" = Option<u32>, Query)),
        responses((status = 200, description = "OK", body = SearchResponse), (status = 400, description = "Missing query")))]
    pub async fn search() {}

    #[utoipa::path(get, path = "/store/regions", tag = "store",
        responses((status = 200, description = "OK", body = RegionListResponse)))]
    pub async fn regions() {}

    #[utoipa::path(get, path = "/store/cache-demo", tag = "store",
        params(("ttl" = Option<u64>, Query, description = "Seconds to cache a computed payload, at most one day")),
        responses((status = 200, description = "OK", body = DemoResponse), (status = 400, description = "TTL out of range")))]
    pub async fn cache_demo() {}

    #[utoipa::path(post, path = "/store/otp/send", tag = "auth", request_body = SendCodeRequest,
        responses((status = 200, description = "OK", body = SendCodeResponse), (status = 400, description = "Invalid request"), (status = 500, description = "SMS delivery failed")))]
    pub async fn otp_send() {}

    #[utoipa::path(post, path = "/store/otp/verify", tag = "auth", request_body = VerifyCodeRequest,
        responses((status = 200, description = "OK", body = VerifyCodeResponse)))]
    pub async fn otp_verify() {}

    #[utoipa::path(post, path = "/store/auth/sms/send", tag = "auth", request_body = SmsSendRequest,
        responses((status = 200, description = "OK", body = SmsSendResponse), (status = 400, description = "Invalid phone number")))]
    pub async fn sms_send() {}

    #[utoipa::path(post, path = "/store/auth/sms/verify", tag = "auth", request_body = SmsVerifyRequest,
        responses((status = 200, description = "OK", body = SmsVerifyResponse), (status = 401, description = "Invalid or expired code")))]
    pub async fn sms_verify() {}

    #[utoipa::path(get, path = "/store/customers/me", tag = "auth",
        responses((status = 200, description = "OK", body = Customer), (status = 401, description = "Missing or invalid token")))]
    pub async fn customer_me() {}

    #[utoipa::path(get, path = "/admin/reviews", tag = "admin",
        params(("status" = Option<String>, Query), ("product_id" = Option<String>, Query), ("limit" = Option<u32>, Query), ("offset" = Option<u32>, Query)),
        responses((status = 200, description = "OK", body = ReviewListResponse)))]
    pub async fn admin_reviews() {}

    #[utoipa::path(post, path = "/admin/reviews", tag = "admin", request_body = AdminCreateReviewRequest,
        responses((status = 201, description = "Created", body = Review)))]
    pub async fn admin_create_review() {}

    #[utoipa::path(get, path = "/admin/reviews/{id}", tag = "admin",
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = Review), (status = 404, description = "Not found")))]
    pub async fn admin_review() {}

    #[utoipa::path(delete, path = "/admin/reviews/{id}", tag = "admin",
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = DeleteResponse), (status = 404, description = "Not found")))]
    pub async fn admin_delete_review() {}

    #[utoipa::path(post, path = "/admin/reviews/{id}/approve", tag = "admin",
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = Review)))]
    pub async fn admin_approve_review() {}

    #[utoipa::path(post, path = "/admin/reviews/{id}/reject", tag = "admin",
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = Review)))]
    pub async fn admin_reject_review() {}

    #[utoipa::path(get, path = "/admin/product-videos", tag = "admin",
        params(("product_id" = Option<String>, Query)), responses((status = 200, description = "OK", body = VideoListResponse)))]
    pub async fn admin_videos() {}

    #[utoipa::path(post, path = "/admin/product-videos", tag = "admin", request_body = CreateVideoRequest,
        responses((status = 201, description = "Created", body = ProductVideo), (status = 404, description = "Unknown product")))]
    pub async fn admin_create_video() {}

    #[utoipa::path(put, path = "/admin/product-videos/{id}", tag = "admin", request_body = UpdateVideoRequest,
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = ProductVideo)))]
    pub async fn admin_update_video() {}

    #[utoipa::path(delete, path = "/admin/product-videos/{id}", tag = "admin",
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = DeleteResponse)))]
    pub async fn admin_delete_video() {}

    #[utoipa::path(get, path = "/admin/product-media", tag = "admin",
        params(("product_id" = Option<String>, Query), ("kind" = Option<String>, Query)), responses((status = 200, description = "OK", body = MediaListResponse)))]
    pub async fn admin_media() {}

    #[utoipa::path(post, path = "/admin/product-media", tag = "admin", request_body = CreateMediaRequest,
        responses((status = 201, description = "Created", body = ProductMedia)))]
    pub async fn admin_create_media() {}

    #[utoipa::path(put, path = "/admin/product-media/{id}", tag = "admin", request_body = UpdateMediaRequest,
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = ProductMedia)))]
    pub async fn admin_update_media() {}

    #[utoipa::path(delete, path = "/admin/product-media/{id}", tag = "admin",
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = DeleteResponse)))]
    pub async fn admin_delete_media() {}

    #[utoipa::path(get, path = "/admin/banners", tag = "admin", responses((status = 200, description = "OK", body = BannerListResponse)))]
    pub async fn admin_banners() {}

    #[utoipa::path(post, path = "/admin/banners", tag = "admin", request_body = CreateBannerRequest,
        responses((status = 201, description = "Created", body = Banner)))]
    pub async fn admin_create_banner() {}

    #[utoipa::path(put, path = "/admin/banners/{id}", tag = "admin", request_body = UpdateBannerRequest,
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = Banner)))]
    pub async fn admin_update_banner() {}

    #[utoipa::path(delete, path = "/admin/banners/{id}", tag = "admin",
        params(("id" = uuid::Uuid, Path)), responses((status = 200, description = "OK", body = DeleteResponse)))]
    pub async fn admin_delete_banner() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes() {
        let doc = document(None);
        assert!(doc["paths"]["/store/reviews"]["post"].is_object());
        assert!(doc["paths"]["/admin/reviews/{id}/approve"]["post"].is_object());
    }

    #[test]
    fn test_static_document_is_merged() {
        let path = std::env::temp_dir().join(format!("storefront-openapi-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "openapi: 3.1.0\ninfo:\n  title: extra\n  version: '1'\npaths:\n  /store/custom:\n    get:\n      responses:\n        '200':\n          description: ok\n").unwrap();
        let doc = document(path.to_str());
        std::fs::remove_file(&path).ok();
        assert!(doc["paths"]["/store/custom"]["get"].is_object());
        assert!(doc["paths"]["/store/search"]["get"].is_object());
    }

    #[tokio::test]
    async fn test_swagger_page_is_complete() {
        let Html(page) = swagger_ui().await;
        assert!(page.contains(r##"dom_id: "#swagger-ui""##));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
