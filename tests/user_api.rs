//! User API integration tests

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{auth_header, login, signup, test_app, user_id, PASSWORD};

#[tokio::test]
async fn test_me_and_public_view() {
    let app = test_app();
    let tokens = signup(&app.server, "a@x.com").await;
    let (name, value) = auth_header(&tokens.access_token);

    let response = app.server.get("/v1/user/me").add_header(name.clone(), value.clone()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let me: Value = response.json();
    assert_eq!(me["email"], "a@x.com");
    assert!(me["cart"].as_array().unwrap().is_empty());
    assert!(me.get("password_hash").is_none());

    let id = me["id"].as_str().unwrap();
    let response = app
        .server
        .get(&format!("/v1/user/by-id/{}", id))
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let public: Value = response.json();
    assert_eq!(public["first_name"], "Ada");
    assert!(public.get("email").is_none());

    let response = app
        .server
        .get("/v1/user/by-id/not-a-uuid")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_users_paginates() {
    let app = test_app();
    let tokens = signup(&app.server, "a@x.com").await;
    signup(&app.server, "b@x.com").await;
    signup(&app.server, "c@x.com").await;

    let (name, value) = auth_header(&tokens.access_token);
    let response = app
        .server
        .get("/v1/user")
        .add_query_param("limit", 2)
        .add_query_param("page", 2)
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let page: Value = response.json();
    assert_eq!(page["total_documents"], 3);
    assert_eq!(page["page"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let response = app
        .server
        .get("/v1/user")
        .add_query_param("limit", 0)
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/v1/user")
        .add_query_param("limit", 100)
        .add_query_param("page", i64::MAX)
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password_revokes_tokens() {
    let app = test_app();
    let tokens = signup(&app.server, "a@x.com").await;
    let (name, value) = auth_header(&tokens.access_token);

    let response = app
        .server
        .patch("/v1/user/update/password")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "old_password": "wrongpass1", "new_password": "newpass12" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .patch("/v1/user/update/password")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "old_password": PASSWORD, "new_password": "newpass12" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app.server.get("/v1/user/me").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let tokens = login(&app.server, "a@x.com", "newpass12").await;
    assert!(!tokens.access_token.is_empty());
}

#[tokio::test]
async fn test_profile_and_brand_name() {
    let app = test_app();
    let first = signup(&app.server, "a@x.com").await;
    let second = signup(&app.server, "b@x.com").await;
    let (name, value) = auth_header(&first.access_token);

    let response = app
        .server
        .patch("/v1/user/update/profile")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "instagram": "@kamou" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app
        .server
        .patch("/v1/user/update/brand-name")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "brand_name": "Kamou Wears" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let me: Value = app.server.get("/v1/user/me").add_header(name.clone(), value.clone()).await.json();
    assert_eq!(me["instagram"], "@kamou");
    assert_eq!(me["brand_name"], "Kamou Wears");

    let (other_name, other_value) = auth_header(&second.access_token);
    let response = app
        .server
        .patch("/v1/user/update/brand-name")
        .add_header(other_name, other_value)
        .json(&json!({ "brand_name": "Kamou Wears" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let response = app
        .server
        .get("/v1/user/brands")
        .add_query_param("keyword", "WEARS")
        .add_header(name, value)
        .await;
    let page: Value = response.json();
    assert_eq!(page["total_documents"], 1);
    assert_eq!(page["items"][0]["brand_name"], "Kamou Wears");
}

#[tokio::test]
async fn test_star_shop_counts_once() {
    let app = test_app();
    let shop = signup(&app.server, "shop@x.com").await;
    let fan = signup(&app.server, "fan@x.com").await;
    let shop_id = user_id(&app.server, &shop.access_token).await;
    let path = format!("/v1/user/star/{}", shop_id);

    let (name, value) = auth_header(&fan.access_token);
    for _ in 0..2 {
        let response = app.server.patch(&path).add_header(name.clone(), value.clone()).await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = app
        .server
        .get(&format!("/v1/user/by-id/{}", shop_id))
        .add_header(name, value)
        .await;
    let public: Value = response.json();
    assert_eq!(public["stars"], 1);
    assert_eq!(public["starred_by"].as_array().unwrap().len(), 1);

    let (shop_name, shop_value) = auth_header(&shop.access_token);
    let response = app.server.patch(&path).add_header(shop_name, shop_value).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_image() {
    let app = test_app();
    let tokens = signup(&app.server, "a@x.com").await;
    let (name, value) = auth_header(&tokens.access_token);

    let form = MultipartForm::new().add_part(
        "upload",
        Part::bytes(b"fake png".to_vec())
            .file_name("avatar.png")
            .mime_type("image/png"),
    );
    let response = app
        .server
        .patch("/v1/user/update/image")
        .add_header(name.clone(), value.clone())
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["image"], "https://images.test/test/avatar.png");
    assert_eq!(*app.images.uploads.lock().unwrap(), vec!["avatar.png".to_string()]);

    let response = app
        .server
        .patch("/v1/user/update/image")
        .add_header(name, value)
        .multipart(MultipartForm::new().add_text("note", "no file"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_account() {
    let app = test_app();
    let tokens = signup(&app.server, "a@x.com").await;
    let (name, value) = auth_header(&tokens.access_token);

    let response = app
        .server
        .delete("/v1/user")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "password": "wrongpass1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .delete("/v1/user")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "password": PASSWORD }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    // The account's tokens are gone with it
    let response = app.server.get("/v1/user/me").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
