mod common;

use axum::body::Body;
use axum::http::Request;
use chrono::{Duration, Utc};
use common::{json_of, TestApp};
use serde_json::json;

#[tokio::test]
async fn admin_routes_require_the_api_key() {
    let app = TestApp::new();
    let (status, body) = app.get("/admin/reviews").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "unauthorized");

    let req = Request::get("/admin/reviews").header("authorization", "Bearer wrong").body(Body::empty()).unwrap();
    assert_eq!(json_of(app.send(req).await).await.0, 401);

    let (status, _) = app.admin("GET", "/admin/reviews", None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn review_moderation_and_filters() {
    let app = TestApp::new();
    let (status, created) = app.admin("POST", "/admin/reviews", Some(json!({ "product_id": "prod_pants", "author": "Staff", "rating": 3, "content": "Imported", "status": "approved" }))).await;
    assert_eq!(status, 201);
    assert_eq!(created["status"], "approved");
    let (_, pending) = app.post("/store/reviews", json!({ "product_id": "prod_pants", "author": "Bo", "rating": 2, "content": "Too long" })).await;

    let (_, list) = app.admin("GET", "/admin/reviews?status=pending", None).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["reviews"][0]["id"], pending["id"]);

    let (status, _) = app.admin("GET", "/admin/reviews?status=spam", None).await;
    assert_eq!(status, 400);

    let id = pending["id"].as_str().unwrap();
    let (_, rejected) = app.admin("POST", &format!("/admin/reviews/{id}/reject"), None).await;
    assert_eq!(rejected["status"], "rejected");

    let (status, deleted) = app.admin("DELETE", &format!("/admin/reviews/{id}"), None).await;
    assert_eq!(status, 200);
    assert_eq!(deleted["deleted"], true);
    let (status, _) = app.admin("GET", &format!("/admin/reviews/{id}"), None).await;
    assert_eq!(status, 404);

    let (_, all) = app.admin("GET", "/admin/reviews?product_id=prod_pants", None).await;
    assert_eq!(all["count"], 1);
}

#[tokio::test]
async fn attachments_need_an_existing_product_and_valid_urls() {
    let app = TestApp::new();
    let (status, _) = app.admin("POST", "/admin/product-videos", Some(json!({ "product_id": "nope", "url": "https://v.example.com/x.mp4" }))).await;
    assert_eq!(status, 404);
    let (status, _) = app.admin("POST", "/admin/product-media", Some(json!({ "product_id": "prod_shirt", "url": "not-a-url" }))).await;
    assert_eq!(status, 400);

    let (_, video) = app.admin("POST", "/admin/product-videos", Some(json!({ "product_id": "prod_shirt", "url": "https://v.example.com/x.mp4" }))).await;
    let id = video["id"].as_str().unwrap();
    let (status, updated) = app.admin("PUT", &format!("/admin/product-videos/{id}"), Some(json!({ "title": "Close-up", "rank": 4 }))).await;
    assert_eq!(status, 200);
    assert_eq!(updated["title"], "Close-up");
    assert_eq!(updated["rank"], 4);

    app.admin("DELETE", &format!("/admin/product-videos/{id}"), None).await;
    let (_, videos) = app.get("/store/products/prod_shirt/videos").await;
    assert!(videos["videos"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn store_shows_only_scheduled_active_banners() {
    let app = TestApp::new();
    let now = Utc::now();
    let banner = |title: &str, active: bool, starts: chrono::DateTime<Utc>, ends: chrono::DateTime<Utc>| json!({
        "title": title, "image_url": "https://cdn.example.com/b.jpg", "link_url": "/sale",
        "is_active": active, "starts_at": starts, "ends_at": ends,
    });
    let (status, _) = app.admin("POST", "/admin/banners", Some(banner("Live", true, now - Duration::hours(1), now + Duration::hours(1)))).await;
    assert_eq!(status, 201);
    app.admin("POST", "/admin/banners", Some(banner("Expired", true, now - Duration::days(2), now - Duration::days(1)))).await;
    app.admin("POST", "/admin/banners", Some(banner("Upcoming", true, now + Duration::days(1), now + Duration::days(2)))).await;
    app.admin("POST", "/admin/banners", Some(banner("Off", false, now - Duration::hours(1), now + Duration::hours(1)))).await;

    let (_, store) = app.get("/store/banners").await;
    let titles: Vec<&str> = store["banners"].as_array().unwrap().iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Live"]);

    let (_, all) = app.admin("GET", "/admin/banners", None).await;
    assert_eq!(all["banners"].as_array().unwrap().len(), 4);

    let (status, _) = app.admin("POST", "/admin/banners", Some(banner("Backwards", true, now, now - Duration::hours(1)))).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn explicit_null_clears_optional_fields() {
    let app = TestApp::new();
    let now = Utc::now();
    let (_, banner) = app.admin("POST", "/admin/banners", Some(json!({
        "title": "Ended", "subtitle": "Last call", "image_url": "https://cdn.example.com/b.jpg",
        "starts_at": now - Duration::days(2), "ends_at": now - Duration::days(1),
    }))).await;
    let id = banner["id"].as_str().unwrap();

    let (status, kept) = app.admin("PUT", &format!("/admin/banners/{id}"), Some(json!({ "rank": 2 }))).await;
    assert_eq!(status, 200);
    assert_eq!(kept["subtitle"], "Last call");
    assert!(kept["ends_at"].is_string());

    let (_, cleared) = app.admin("PUT", &format!("/admin/banners/{id}"), Some(json!({ "ends_at": null, "subtitle": null }))).await;
    assert!(cleared["ends_at"].is_null());
    assert!(cleared["subtitle"].is_null());
    let (_, store) = app.get("/store/banners").await;
    assert_eq!(store["banners"][0]["title"], "Ended");

    let (_, video) = app.admin("POST", "/admin/product-videos", Some(json!({ "product_id": "prod_shirt", "url": "https://v.example.com/x.mp4", "title": "Intro" }))).await;
    let vid = video["id"].as_str().unwrap();
    let (_, video) = app.admin("PUT", &format!("/admin/product-videos/{vid}"), Some(json!({ "title": null }))).await;
    assert!(video["title"].is_null());
}
