//! Common test utilities and helpers
//!
//! Builds the full router on in-memory backends and provides helpers for
//! registering users and authenticating requests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use kamou_shop::backend::auth::{MemoryCodeStore, PasswordHasher, TokenMaker, TokenPair, TokenPolicy};
use kamou_shop::backend::images::{ImageError, ImageHost, ImageUpload, UploadedImage};
use kamou_shop::backend::routes::create_router;
use kamou_shop::backend::server::{AppState, Dependencies};
use kamou_shop::backend::storage::MemoryStore;

pub const TEST_KEY: &str = "an-example-signing-key-of-32-bytes!";
pub const PASSWORD: &str = "abcdefg";

/// Image host that keeps track of what was uploaded and deleted
#[derive(Default)]
pub struct RecordingImageHost {
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageHost for RecordingImageHost {
    async fn upload(&self, upload: ImageUpload) -> Result<UploadedImage, ImageError> {
        let public_id = format!("test/{}", upload.file_name);
        self.uploads.lock().unwrap().push(upload.file_name);
        Ok(UploadedImage {
            url: format!("https://images.test/{}", public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), ImageError> {
        self.deletes.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub images: Arc<RecordingImageHost>,
}

/// Full router on in-memory storage with a cheap bcrypt cost
pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let images = Arc::new(RecordingImageHost::default());

    let app_state = AppState::new(Dependencies {
        store: store.clone(),
        codes: Arc::new(MemoryCodeStore::new()),
        images: images.clone(),
        token_maker: TokenMaker::new(TEST_KEY).unwrap(),
        hasher: PasswordHasher::new(4),
        policy: TokenPolicy::default(),
    });

    TestApp {
        server: TestServer::new(create_router(app_state)).unwrap(),
        store,
        images,
    }
}

/// `x-auth-token: Bearer <token>`
pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-auth-token"),
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

/// Register a user and return the verification code
pub async fn register(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/v1/auth/register")
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Obi",
            "email": email,
            "password": PASSWORD,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    body["code"].as_str().unwrap().to_string()
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> TokenPair {
    let response = server
        .post("/v1/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    serde_json::from_value(body["tokens"].clone()).unwrap()
}

/// Register, log in and return the token pair
pub async fn signup(server: &TestServer, email: &str) -> TokenPair {
    register(server, email).await;
    login(server, email, PASSWORD).await
}

/// Id of the user behind `access_token`
pub async fn user_id(server: &TestServer, access_token: &str) -> String {
    let (name, value) = auth_header(access_token);
    let response = server.get("/v1/user/me").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_string()
}
