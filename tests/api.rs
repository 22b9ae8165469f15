mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use storefront_lib::controller::routing::make_router;
use storefront_lib::controller::AppState;
use storefront_lib::types::DbPool;
use tower::ServiceExt;

use common::*;

fn router(pool: &DbPool) -> axum::Router {
    make_router(AppState::new(pool.clone()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(pool: &DbPool, uri: &str) -> (StatusCode, Value) {
    let response = router(pool)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

async fn send_form(
    pool: &DbPool,
    uri: &str,
    auth: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(auth) = auth {
        request = request.header(header::AUTHORIZATION, auth);
    }
    let response = router(pool)
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn healthcheck_responds() {
    let pool = test_pool().await;
    let (status, body) = get(&pool, "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Ok"));
}

#[tokio::test]
async fn categories_listing_is_paginated() {
    let pool = test_pool().await;
    seed_category(&pool, "Pizza", "pizza").await;
    seed_category(&pool, "Beer", "beer").await;
    seed_category(&pool, "Snacks", "snacks").await;

    let (status, body) = get(&pool, "/categories/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["objects_count"], json!(3));
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert!(body["next"].is_string());
    assert!(body["previous"].is_null());
    assert_eq!(body["items"][0]["slug"], json!("pizza"));

    let (_, body) = get(&pool, "/categories/?page=2").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert!(body["next"].is_null());
    assert!(body["previous"].is_string());

    // Requested page size is capped at the maximum of 10.
    let (_, body) = get(&pool, "/categories/?page_size=50").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn beer_endpoints_cover_search_and_detail() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Beer", "beer").await;
    let ipa = seed_beer(&pool, &category, "Craft IPA", "craft-ipa", "5.50").await;
    seed_beer(&pool, &category, "Dark Stout", "dark-stout", "7.00").await;

    let (status, body) = get(&pool, "/beer/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(&pool, "/beer/?search=ipa").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], json!("Craft IPA"));
    assert_eq!(body[0]["grade"], json!("IPA"));

    let (_, body) = get(&pool, "/beer/?search=5.5").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = get(&pool, "/beer/?search=no-such-beer").await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (status, body) = get(&pool, &format!("/beer/{}/", ipa.base.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], json!("craft-ipa"));
    assert_eq!(body["price"], json!("5.50"));

    let (status, _) = get(&pool, "/beer/999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customers_listing_is_unfiltered() {
    let pool = test_pool().await;
    seed_customer(&pool, "testuser", "testuser@example.ru").await;

    let (status, body) = get(&pool, "/customers/").await;
    assert_eq!(status, StatusCode::OK);
    let customers = body.as_array().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["phone"], json!("+7 900 123-45-67"));
    assert_eq!(customers[0]["orders"], json!([]));
}

#[tokio::test]
async fn cart_flow_over_http() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Pizza", "pizza").await;
    seed_pizza(&pool, &category, "Test pizza", "test-pizza", "100.00").await;
    let (user, _) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let auth = user.id.to_string();

    let (status, _) = get(&pool, "/cart/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_form(&pool, "/add-to-cart/pizza/test-pizza/", Some(&auth), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["total_items"], json!(1));
    assert_eq!(body["cart"]["final_price"], json!("100.00"));
    assert_eq!(body["items"][0]["title"], json!("Test pizza"));

    let (status, body) =
        send_form(&pool, "/change-qty/pizza/test-pizza/", Some(&auth), "qty=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["final_price"], json!("300.00"));

    let (status, body) = send_form(&pool, "/change-qty/pizza/test-pizza/", Some(&auth), "qty=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("quantity"));

    let (status, body) =
        send_form(&pool, "/remove-from-cart/pizza/test-pizza/", Some(&auth), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["total_items"], json!(0));
    assert_eq!(body["cart"]["final_price"], json!("0"));

    let (status, _) = send_form(&pool, "/add-to-cart/pizza/no-such-slug/", Some(&auth), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_cart_is_keyed_by_session_header() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Pizza", "pizza").await;
    seed_pizza(&pool, &category, "Test pizza", "test-pizza", "100.00").await;

    let session = uuid::Uuid::new_v4().to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/add-to-cart/pizza/test-pizza/")
        .header("x-session-id", &session)
        .body(Body::empty())
        .unwrap();
    let response = router(&pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cart"]["for_anonymous_user"], json!(true));
    assert_eq!(body["cart"]["session_id"], json!(session));
}

#[tokio::test]
async fn checkout_exposes_a_client_secret() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Pizza", "pizza").await;
    seed_pizza(&pool, &category, "Test pizza", "test-pizza", "100.00").await;
    let (user, _) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let auth = user.id.to_string();

    send_form(&pool, "/add-to-cart/pizza/test-pizza/", Some(&auth), "").await;

    let request = Request::builder()
        .uri("/checkout/")
        .header(header::AUTHORIZATION, &auth)
        .body(Body::empty())
        .unwrap();
    let response = router(&pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["cart"]["cart"]["final_price"], json!("100.00"));
    assert!(body["client_secret"].as_str().unwrap().starts_with("pi_"));
}

#[tokio::test]
async fn order_flow_over_http() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Pizza", "pizza").await;
    seed_pizza(&pool, &category, "Test pizza", "test-pizza", "100.00").await;
    let (user, _) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let auth = user.id.to_string();

    send_form(&pool, "/add-to-cart/pizza/test-pizza/", Some(&auth), "").await;

    let form = "first_name=Ivan&last_name=Petrov&phone=%2B7+900+123-45-67\
                &address=Lenina+1&buying_type=delivery&order_date=2021-06-01&comment=call";
    let (status, body) = send_form(&pool, "/make-order/", Some(&auth), form).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], json!("new"));
    assert_eq!(body["buying_type"], json!("delivery"));

    // The cart is frozen now; the profile shows the order.
    let request = Request::builder()
        .uri("/profile/")
        .header(header::AUTHORIZATION, &auth)
        .body(Body::empty())
        .unwrap();
    let response = router(&pool).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn instant_payment_returns_payed_status() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Pizza", "pizza").await;
    seed_pizza(&pool, &category, "Test pizza", "test-pizza", "100.00").await;
    let (user, _) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let auth = user.id.to_string();

    send_form(&pool, "/add-to-cart/pizza/test-pizza/", Some(&auth), "").await;

    let (status, body) = send_form(&pool, "/payed-online-order/", Some(&auth), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "payed" }));
}

#[tokio::test]
async fn registration_and_login_over_http() {
    let pool = test_pool().await;

    let form = "username=newuser&password=hunter22&confirm_password=hunter22\
                &first_name=Ivan&last_name=Petrov&email=newuser%40example.com";
    let (status, body) = send_form(&pool, "/registration/", None, form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("domain"));

    let form = "username=newuser&password=hunter22&confirm_password=hunter22\
                &first_name=Ivan&last_name=Petrov&email=newuser%40example.ru";
    let (status, body) = send_form(&pool, "/registration/", None, form).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_number());

    let (status, body) = send_form(&pool, "/login/", None, "username=newuser&password=hunter22").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], json!("newuser"));

    let (status, _) = send_form(&pool, "/login/", None, "username=newuser&password=wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_save_enforces_slug_uniqueness_and_image_bounds() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Beer", "beer").await;

    let payload = |slug: &str, width: u32| {
        json!({
            "category_id": category.id.0,
            "title": "Craft IPA",
            "slug": slug,
            "image": { "file_name": "ipa.png", "width": width, "height": 700, "data": [0, 1, 2] },
            "description": "hoppy",
            "price": "5.50",
            "colour": "amber",
            "alcohol_strength": "5.9%",
            "filtered": "unfiltered",
            "grade": "IPA"
        })
    };

    let send = |body: Value| {
        let pool = pool.clone();
        async move {
            let request = Request::builder()
                .method("POST")
                .uri("/products/beer/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let response = router(&pool).oneshot(request).await.unwrap();
            let status = response.status();
            (status, body_json(response).await)
        }
    };

    let (status, _) = send(payload("craft-ipa", 700)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(payload("craft-ipa", 700)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("slug"));

    let (status, body) = send(payload("small-image", 100)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("resolution"));
}
