mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use common::{json_of, json_request, TestApp};
use serde_json::json;
use storefront_services::domain::aggregates::{Customer, CustomerProfile};
use storefront_services::domain::value_objects::PhoneNumber;
use storefront_services::repository::{CustomerRepository, InMemoryStore, RepoResult};
use uuid::Uuid;

const PHONE: &str = "+1 (555) 010-2030";
const NORMALIZED: &str = "+15550102030";

#[tokio::test]
async fn sms_login_registers_then_recognises_customer() {
    let app = TestApp::new();
    let (status, sent) = app.post("/store/auth/sms/send", json!({ "phone": PHONE })).await;
    assert_eq!(status, 200);
    assert_eq!(sent["phone"], NORMALIZED);
    assert_eq!(sent["expires_in"], 300);

    let code = app.outbox.last_code(NORMALIZED).expect("code sent by sms");
    let (status, _) = app.post("/store/auth/sms/verify", json!({ "phone": PHONE, "code": "000000x" })).await;
    assert_eq!(status, 401);

    let (status, login) = app.post("/store/auth/sms/verify", json!({ "phone": PHONE, "code": code, "first_name": "Ada" })).await;
    assert_eq!(status, 200);
    assert_eq!(login["is_new"], true);
    assert_eq!(login["customer"]["first_name"], "Ada");
    let token = login["token"].as_str().unwrap().to_string();

    let (status, _) = app.post("/store/auth/sms/verify", json!({ "phone": PHONE, "code": code })).await;
    assert_eq!(status, 401, "codes are single-use");

    let (status, me) = json_of(app.send(Request::get("/store/customers/me").header("authorization", format!("Bearer {token}")).body(Body::empty()).unwrap()).await).await;
    assert_eq!(status, 200);
    assert_eq!(me["phone"], NORMALIZED);

    app.post("/store/auth/sms/send", json!({ "phone": NORMALIZED })).await;
    let code = app.outbox.last_code(NORMALIZED).unwrap();
    let (_, again) = app.post("/store/auth/sms/verify", json!({ "phone": NORMALIZED, "code": code, "last_name": "Lovelace" })).await;
    assert_eq!(again["is_new"], false);
    assert_eq!(again["customer"]["id"], login["customer"]["id"]);
    assert_eq!(again["customer"]["last_name"], "Lovelace");
}

#[tokio::test]
async fn invalid_phone_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.post("/store/auth/sms/send", json!({ "phone": "call me maybe" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn customer_endpoint_requires_token() {
    let app = TestApp::new();
    let (status, _) = app.get("/store/customers/me").await;
    assert_eq!(status, 401);
    let req = Request::get("/store/customers/me").header("authorization", "Bearer garbage").body(Body::empty()).unwrap();
    assert_eq!(json_of(app.send(req).await).await.0, 401);
}

#[tokio::test]
async fn generic_otp_flow() {
    let app = TestApp::new();
    let (status, _) = app.post("/store/otp/send", json!({ "identifier": NORMALIZED })).await;
    assert_eq!(status, 200);
    let code = app.outbox.last_code(NORMALIZED).unwrap();

    let (_, wrong) = app.post("/store/otp/verify", json!({ "identifier": NORMALIZED, "code": "bad" })).await;
    assert_eq!(wrong["verified"], false);
    let (_, ok) = app.post("/store/otp/verify", json!({ "identifier": NORMALIZED, "code": code })).await;
    assert_eq!(ok["verified"], true);
    let (_, reused) = app.post("/store/otp/verify", json!({ "identifier": NORMALIZED, "code": code })).await;
    assert_eq!(reused["verified"], false);
}

#[tokio::test]
async fn signed_in_customer_can_review_without_author() {
    let app = TestApp::new();
    app.post("/store/auth/sms/send", json!({ "phone": NORMALIZED })).await;
    let code = app.outbox.last_code(NORMALIZED).unwrap();
    let (_, login) = app.post("/store/auth/sms/verify", json!({ "phone": NORMALIZED, "code": code, "first_name": "Ada", "last_name": "L" })).await;
    let token = login["token"].as_str().unwrap();

    let req = json_request("POST", "/store/reviews", json!({ "product_id": "prod_shirt", "rating": 4, "content": "Soft" }), Some(token));
    let (status, review) = json_of(app.send(req).await).await;
    assert_eq!(status, 201);
    assert_eq!(review["author"], "Ada L");
    assert_eq!(review["customer_id"], login["customer"]["id"]);
}

#[tokio::test]
async fn otp_send_rejects_identifiers_without_sms_delivery() {
    let app = TestApp::new();
    let (status, body) = app.post("/store/otp/send", json!({ "identifier": "ada@example.com" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_request");
    assert!(body.get("sent").is_none());
    assert!(app.outbox.0.lock().unwrap().is_empty());

    let (_, verified) = app.post("/store/otp/verify", json!({ "identifier": "ada@example.com", "code": "123456" })).await;
    assert_eq!(verified["verified"], false);
}

/// Hides the phone from the first lookup and registers a rival customer
/// in the gap, as a concurrent first login would.
struct RegisteredMeanwhile {
    inner: Arc<InMemoryStore>,
    raced: AtomicBool,
}

#[async_trait]
impl CustomerRepository for RegisteredMeanwhile {
    async fn save(&self, customer: &Customer) -> RepoResult<()> { self.inner.save(customer).await }
    async fn insert_new(&self, customer: &Customer) -> RepoResult<bool> { self.inner.insert_new(customer).await }
    async fn find(&self, id: Uuid) -> RepoResult<Option<Customer>> { CustomerRepository::find(self.inner.as_ref(), id).await }
    async fn find_by_phone(&self, phone: &PhoneNumber) -> RepoResult<Option<Customer>> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            let (rival, _) = Customer::register(phone.clone(), CustomerProfile::default());
            self.inner.insert_new(&rival).await?;
            return Ok(None);
        }
        self.inner.find_by_phone(phone).await
    }
}

#[tokio::test]
async fn losing_a_registration_race_logs_into_the_existing_customer() {
    let app = TestApp::build(vec![common::region("na", &["us"])], |repos, store| {
        repos.customers = Arc::new(RegisteredMeanwhile { inner: store.clone(), raced: AtomicBool::new(false) });
    });
    app.post("/store/auth/sms/send", json!({ "phone": NORMALIZED })).await;
    let code = app.outbox.last_code(NORMALIZED).unwrap();

    let (status, login) = app.post("/store/auth/sms/verify", json!({ "phone": NORMALIZED, "code": code, "first_name": "Ada" })).await;
    assert_eq!(status, 200);
    assert_eq!(login["is_new"], false);
    assert_eq!(login["customer"]["first_name"], "Ada");

    let phone = PhoneNumber::parse(NORMALIZED).unwrap();
    let stored = app.store.find_by_phone(&phone).await.unwrap().unwrap();
    assert_eq!(login["customer"]["id"], stored.id.to_string());
}
