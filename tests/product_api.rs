//! Product, cart and order API integration tests

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{auth_header, signup, test_app, user_id};

fn product_form(name: &str, price: i64) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name)
        .add_text("description", "Hand made leather item")
        .add_text("price", price.to_string())
        .add_text("total_stock", "5")
}

async fn create_product(
    server: &TestServer,
    header: &(HeaderName, HeaderValue),
    form: MultipartForm,
) -> Value {
    let response = server
        .post("/v1/product")
        .add_header(header.0.clone(), header.1.clone())
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_create_and_get_product() {
    let app = test_app();
    let tokens = signup(&app.server, "shop@x.com").await;
    let header = auth_header(&tokens.access_token);

    let form = product_form("Leather bag", 4500).add_part(
        "upload",
        Part::bytes(b"jpeg".to_vec()).file_name("bag.jpg").mime_type("image/jpeg"),
    );
    let product = create_product(&app.server, &header, form).await;
    assert_eq!(product["name"], "Leather bag");
    assert_eq!(product["price"], 4500);
    assert_eq!(product["image"], "https://images.test/test/bag.jpg");

    let id = product["id"].as_str().unwrap();
    let response = app
        .server
        .get(&format!("/v1/product/{}", id))
        .add_header(header.0.clone(), header.1.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let fetched: Value = response.json();
    assert_eq!(fetched, product);
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = test_app();
    let tokens = signup(&app.server, "shop@x.com").await;
    let header = auth_header(&tokens.access_token);

    let response = app
        .server
        .post("/v1/product")
        .add_header(header.0.clone(), header.1.clone())
        .multipart(product_form("Bag", -1))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/v1/product")
        .add_header(header.0.clone(), header.1.clone())
        .multipart(MultipartForm::new().add_text("name", "Leather bag"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_and_search_products() {
    let app = test_app();
    let tokens = signup(&app.server, "shop@x.com").await;
    let header = auth_header(&tokens.access_token);
    let owner = user_id(&app.server, &tokens.access_token).await;

    for name in ["Leather bag", "Leather belt", "Canvas shoe"] {
        create_product(&app.server, &header, product_form(name, 100)).await;
    }

    let response = app
        .server
        .get("/v1/product/products/by-id")
        .add_query_param("user_id", &owner)
        .add_query_param("limit", 2)
        .add_header(header.0.clone(), header.1.clone())
        .await;
    let page: Value = response.json();
    assert_eq!(page["total_documents"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);

    let response = app
        .server
        .get("/v1/product/products/by-name")
        .add_query_param("keyword", "leather")
        .add_header(header.0.clone(), header.1.clone())
        .await;
    let page: Value = response.json();
    assert_eq!(page["total_documents"], 2);

    let response = app
        .server
        .get("/v1/product/products/by-id")
        .add_query_param("user_id", "nope")
        .add_header(header.0.clone(), header.1.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_are_owner_only() {
    let app = test_app();
    let owner = signup(&app.server, "shop@x.com").await;
    let other = signup(&app.server, "other@x.com").await;
    let owner_header = auth_header(&owner.access_token);
    let other_header = auth_header(&other.access_token);

    let product = create_product(&app.server, &owner_header, product_form("Leather bag", 4500)).await;
    let id = product["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .patch("/v1/product/update")
        .add_header(other_header.0.clone(), other_header.1.clone())
        .json(&json!({ "id": id, "price": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .patch("/v1/product/update")
        .add_header(owner_header.0.clone(), owner_header.1.clone())
        .json(&json!({ "id": id }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .server
        .patch("/v1/product/update")
        .add_header(owner_header.0.clone(), owner_header.1.clone())
        .json(&json!({ "id": id, "price": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["price"], 1);
    assert_eq!(updated["description"], product["description"]);

    let path = format!("/v1/product/{}", id);
    let response = app
        .server
        .delete(&path)
        .add_header(other_header.0.clone(), other_header.1.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = app
        .server
        .delete(&path)
        .add_header(owner_header.0.clone(), owner_header.1.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = app
        .server
        .get(&path)
        .add_header(owner_header.0.clone(), owner_header.1.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_to_order() {
    let app = test_app();
    let shop = signup(&app.server, "shop@x.com").await;
    let buyer = signup(&app.server, "buyer@x.com").await;
    let shop_header = auth_header(&shop.access_token);
    let buyer_header = auth_header(&buyer.access_token);

    let product = create_product(&app.server, &shop_header, product_form("Leather bag", 4500)).await;
    let id = product["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .post("/v1/product/make-order")
        .add_header(buyer_header.0.clone(), buyer_header.1.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    for _ in 0..3 {
        let response = app
            .server
            .post("/v1/product/add-to-cart")
            .add_header(buyer_header.0.clone(), buyer_header.1.clone())
            .json(&json!({ "prod_id": id }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let response = app
        .server
        .post("/v1/product/make-order")
        .add_header(buyer_header.0.clone(), buyer_header.1.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let order: Value = response.json();
    assert_eq!(order["total_price"], 3 * 4500);
    assert_eq!(order["items"].as_array().unwrap().len(), 3);

    let me: Value = app
        .server
        .get("/v1/user/me")
        .add_header(buyer_header.0.clone(), buyer_header.1.clone())
        .await
        .json();
    assert!(me["cart"].as_array().unwrap().is_empty());

    let orders: Value = app
        .server
        .get("/v1/product/orders")
        .add_header(buyer_header.0.clone(), buyer_header.1.clone())
        .await
        .json();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["id"], order["id"]);
}

#[tokio::test]
async fn test_remove_from_cart() {
    let app = test_app();
    let tokens = signup(&app.server, "shop@x.com").await;
    let header = auth_header(&tokens.access_token);

    let product = create_product(&app.server, &header, product_form("Leather bag", 4500)).await;
    let id = product["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        app.server
            .post("/v1/product/add-to-cart")
            .add_header(header.0.clone(), header.1.clone())
            .json(&json!({ "prod_id": id }))
            .await;
    }

    let path = format!("/v1/product/remove-from-cart/{}", id);
    let body: Value = app
        .server
        .delete(&path)
        .add_header(header.0.clone(), header.1.clone())
        .await
        .json();
    assert_eq!(body["removed"], 2);

    let body: Value = app
        .server
        .delete(&path)
        .add_header(header.0.clone(), header.1.clone())
        .await
        .json();
    assert_eq!(body["removed"], 0);

    let response = app
        .server
        .post("/v1/product/add-to-cart")
        .add_header(header.0.clone(), header.1.clone())
        .json(&json!({ "prod_id": uuid::Uuid::new_v4() }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
