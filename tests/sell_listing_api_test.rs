mod common;

use axum::http::{Method, StatusCode};
use rstest::rstest;
use serde_json::{json, Value};

use common::{edited_listing, read_json, ListingSeed, TestApp};
use dealership_api::entities::{car, car_image, sell_listing_image, sell_listing_original};

fn submission() -> Value {
    json!({
        "sellerName": "Dana Driver",
        "sellerEmail": "dana@example.com",
        "sellerPhone": "+1-555-0199",
        "brandName": "Mazda",
        "model": "MX-5",
        "year": 2021,
        "price": 24500,
        "mileage": 12000,
        "color": "Red",
        "description": "Weekend car",
        "images": [
            "https://img.example.com/mx5/1.jpg",
            "https://img.example.com/mx5/2.jpg"
        ]
    })
}

fn inline_approval() -> Value {
    let mut body = edited_listing("Honda");
    body["status"] = json!("APPROVED");
    body
}

#[tokio::test]
async fn submitted_listing_is_pending_with_images() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/sell-listings", Some(submission()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json(response).await;
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["model"], "MX-5");
    assert_eq!(body["sellerEmail"], "dana@example.com");
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["url"], "https://img.example.com/mx5/1.jpg");
    assert_eq!(images[1]["position"], 1);
    assert_eq!(app.count::<sell_listing_image::Entity>().await, 2);
}

#[tokio::test]
async fn submission_with_bad_email_is_rejected() {
    let app = TestApp::new().await;
    let mut body = submission();
    body["sellerEmail"] = json!("not-an-email");

    let response = app
        .request(Method::POST, "/api/sell-listings", Some(body))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_by_status_and_paginates() {
    let app = TestApp::new().await;
    for _ in 0..3 {
        app.seed_listing(ListingSeed::default()).await;
    }
    app.seed_listing(ListingSeed {
        status: dealership_api::entities::sell_listing::ListingStatus::Rejected,
        ..Default::default()
    })
    .await;

    let response = app
        .request(Method::GET, "/api/sell-listings?status=PENDING&limit=2", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let all = read_json(app.request(Method::GET, "/api/sell-listings", None).await).await;
    assert_eq!(all["total"], 4);
    assert_eq!(all["page"], 1);
}

#[tokio::test]
async fn detail_includes_images_and_joined_records() {
    let app = TestApp::new().await;
    let member = app.seed_member("Mia Member", "mia@example.com").await;
    let listing = app
        .seed_listing(ListingSeed {
            member_id: Some(member.id),
            ..Default::default()
        })
        .await;
    app.seed_listing_images(
        listing.id,
        &["https://img.example.com/1.jpg", "https://img.example.com/2.jpg"],
    )
    .await;

    let before = read_json(
        app.request(Method::GET, &format!("/api/sell-listings/{}", listing.id), None)
            .await,
    )
    .await;
    assert_eq!(before["images"].as_array().unwrap().len(), 2);
    assert_eq!(before["member"]["email"], "mia@example.com");
    assert!(before["car"].is_null());

    let approve = json!({ "status": "APPROVED", "editedListing": edited_listing("Honda") });
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/sell-listings/{}", listing.id),
            Some(approve),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let after = read_json(
        app.request(Method::GET, &format!("/api/sell-listings/{}", listing.id), None)
            .await,
    )
    .await;
    assert_eq!(after["status"], "APPROVED");
    assert_eq!(after["car"]["model"], "Civic EX");
    assert_eq!(after["car"]["status"], "USED");
    assert_eq!(after["brand"]["name"], "Honda");
}

#[tokio::test]
async fn missing_listing_is_404() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/sell-listings/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[rstest]
#[case::nested(json!({ "status": "APPROVED", "editedListing": edited_listing("Honda") }))]
#[case::inline(inline_approval())]
#[tokio::test]
async fn approval_accepts_nested_or_inline_edits(#[case] body: Value) {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/sell-listings/{}", listing.id),
            Some(body),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = read_json(response).await;
    assert_eq!(updated["status"], "APPROVED");
    assert_eq!(updated["model"], "Civic EX");
    assert_eq!(updated["price"], 17900);
    assert!(updated["carId"].is_i64());
    assert_eq!(app.count::<car::Entity>().await, 1);
}

#[tokio::test]
async fn approval_without_brand_is_bad_request() {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;
    let mut edited = edited_listing("Honda");
    edited.as_object_mut().unwrap().remove("brandName");

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/sell-listings/{}", listing.id),
            Some(json!({ "status": "APPROVED", "editedListing": edited })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.count::<car::Entity>().await, 0);
}

#[tokio::test]
async fn reject_requires_a_reason() {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;
    let uri = format!("/api/sell-listings/{}", listing.id);

    let response = app
        .request(Method::PATCH, &uri, Some(json!({ "status": "REJECTED" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let unchanged = read_json(app.request(Method::GET, &uri, None).await).await;
    assert_eq!(unchanged["status"], "PENDING");
    assert!(unchanged["rejectionReason"].is_null());

    let response = app
        .request(
            Method::PATCH,
            &uri,
            Some(json!({ "status": "REJECTED", "rejectionReason": "Mileage does not match" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rejected = read_json(response).await;
    assert_eq!(rejected["status"], "REJECTED");
    assert_eq!(rejected["rejectionReason"], "Mileage does not match");
}

#[tokio::test]
async fn second_approval_over_http_is_409() {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;
    let uri = format!("/api/sell-listings/{}", listing.id);
    let body = json!({ "status": "APPROVED", "editedListing": edited_listing("Honda") });

    let first = app.request(Method::PATCH, &uri, Some(body.clone())).await;
    assert_eq!(first.status(), StatusCode::OK);
    let second = app.request(Method::PATCH, &uri, Some(body)).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(app.count::<car::Entity>().await, 1);
}

#[tokio::test]
async fn unknown_status_value_is_bad_request() {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;

    let response = app
        .request(
            Method::PATCH,
            &format!("/api/sell-listings/{}", listing.id),
            Some(json!({ "status": "ARCHIVED" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_removes_listing_and_its_images() {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;
    app.seed_listing_images(
        listing.id,
        &[
            "https://img.example.com/1.jpg",
            "https://img.example.com/2.jpg",
            "https://img.example.com/3.jpg",
        ],
    )
    .await;
    let uri = format!("/api/sell-listings/{}", listing.id);

    let response = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "success": true }));
    assert_eq!(app.count::<sell_listing_image::Entity>().await, 0);

    let gone = app.request(Method::GET, &uri, None).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_listing_is_404() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::DELETE, "/api/sell-listings/12345", None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_after_approval_keeps_the_car() {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;
    app.seed_listing_images(listing.id, &["https://img.example.com/1.jpg"])
        .await;
    let uri = format!("/api/sell-listings/{}", listing.id);
    app.request(
        Method::PATCH,
        &uri,
        Some(json!({ "status": "APPROVED", "editedListing": edited_listing("Honda") })),
    )
    .await;

    let response = app.request(Method::DELETE, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.count::<car::Entity>().await, 1);
    assert_eq!(app.count::<car_image::Entity>().await, 1);
    assert_eq!(app.count::<sell_listing_original::Entity>().await, 1);
}

#[tokio::test]
async fn brands_are_unique_ignoring_case_and_sorted() {
    let app = TestApp::new().await;

    let created = app
        .request(
            Method::POST,
            "/api/brands",
            Some(json!({ "name": "Volvo", "logoUrl": "https://logos.example.com/volvo.png" })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let volvo = read_json(created).await;
    assert_eq!(volvo["logoUrl"], "https://logos.example.com/volvo.png");

    let duplicate = app
        .request(Method::POST, "/api/brands", Some(json!({ "name": "VOLVO" })))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let audi = read_json(
        app.request(Method::POST, "/api/brands", Some(json!({ "name": "Audi" })))
            .await,
    )
    .await;
    assert_eq!(
        audi["logoUrl"],
        app.state.config.brand_placeholder_logo_url.as_str()
    );

    let brands = read_json(app.request(Method::GET, "/api/brands", None).await).await;
    let names: Vec<&str> = brands
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Audi", "Volvo"]);
}

#[tokio::test]
async fn non_ascii_brand_duplicate_is_409() {
    let app = TestApp::new().await;
    app.seed_brand("ŠKODA").await;

    let duplicate = app
        .request(Method::POST, "/api/brands", Some(json!({ "name": "škoda" })))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn published_cars_are_listed_and_fetched() {
    let app = TestApp::new().await;
    let listing = app.seed_listing(ListingSeed::default()).await;
    app.seed_listing_images(listing.id, &["https://img.example.com/1.jpg"])
        .await;
    let approved = read_json(
        app.request(
            Method::PATCH,
            &format!("/api/sell-listings/{}", listing.id),
            Some(json!({ "status": "APPROVED", "editedListing": edited_listing("Honda") })),
        )
        .await,
    )
    .await;
    let car_id = approved["carId"].as_i64().unwrap();
    let brand_id = approved["brandId"].as_i64().unwrap();

    let listed = read_json(
        app.request(Method::GET, &format!("/api/cars?brandId={}", brand_id), None)
            .await,
    )
    .await;
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["items"][0]["id"], car_id);

    let other_brand = read_json(
        app.request(Method::GET, &format!("/api/cars?brandId={}", brand_id + 1), None)
            .await,
    )
    .await;
    assert_eq!(other_brand["total"], 0);

    let detail = read_json(
        app.request(Method::GET, &format!("/api/cars/{}", car_id), None)
            .await,
    )
    .await;
    assert_eq!(detail["model"], "Civic EX");
    assert_eq!(detail["brand"]["name"], "Honda");
    assert_eq!(detail["images"][0]["url"], "https://img.example.com/1.jpg");

    let missing = app.request(Method::GET, "/api/cars/9999", None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn error_body_carries_request_id() {
    let app = TestApp::new().await;
    let response = app
        .request_with_headers(
            Method::GET,
            "/api/sell-listings/777",
            None,
            &[("x-request-id", "trace-777")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "trace-777");

    let body = read_json(response).await;
    assert_eq!(body["requestId"], "trace-777");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_and_status_report_up() {
    let app = TestApp::new().await;

    let health = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(read_json(health).await["status"], "up");

    let live = app.request(Method::GET, "/health/live", None).await;
    assert_eq!(live.status(), StatusCode::OK);

    let status = read_json(app.request(Method::GET, "/api/status", None).await).await;
    assert_eq!(status["status"], "ok");
    assert_eq!(status["database"], "up");
    assert_eq!(status["allowReapproval"], false);
}

#[tokio::test]
async fn metrics_endpoint_exports_counters() {
    let app = TestApp::new().await;
    app.request(Method::GET, "/api/status", None).await;

    let response = app.request(Method::GET, "/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}

#[rstest]
#[case("/api/sell-listings?page=18446744073709551615")]
#[case("/api/cars?page=18446744073709551615&limit=100")]
#[tokio::test]
async fn out_of_range_page_is_bad_request(#[case] uri: &str) {
    let app = TestApp::new().await;
    app.seed_listing(ListingSeed::default()).await;

    let response = app.request(Method::GET, uri, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("out of range"));
}
