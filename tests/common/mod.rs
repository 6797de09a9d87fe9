#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::{json, Value};
use tower::ServiceExt;

use dealership_api::{
    app_router,
    config::AppConfig,
    db,
    entities::{brand, member, sell_listing, sell_listing::ListingStatus, sell_listing_image},
    events::{self, EventSender},
    AppState,
};

/// Application state and router backed by a fresh in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

/// Overrides for a seeded sell listing
#[derive(Debug, Clone)]
pub struct ListingSeed {
    pub id: Option<i32>,
    pub status: ListingStatus,
    pub image_url: Option<String>,
    pub brand_name: Option<String>,
    pub member_id: Option<i32>,
    pub description: Option<String>,
}

impl Default for ListingSeed {
    fn default() -> Self {
        Self {
            id: None,
            status: ListingStatus::Pending,
            image_url: None,
            brand_name: Some("Honda".to_string()),
            member_id: None,
            description: Some("Garage kept, one owner".to_string()),
        }
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Construct a test application after adjusting the default test config.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "development".to_string(),
        );
        cfg.auto_migrate = true;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), Arc::new(cfg), Arc::new(event_sender));
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let router = app_router(state.clone(), logger);

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub fn db(&self) -> &sea_orm::DatabaseConnection {
        &self.state.db
    }

    pub fn event_sender(&self) -> Arc<EventSender> {
        self.state.event_sender.clone()
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_brand(&self, name: &str) -> brand::Model {
        let now = Utc::now();
        brand::ActiveModel {
            name: Set(name.to_string()),
            name_key: Set(brand::name_key(name)),
            logo_url: Set(format!("https://logos.example.com/{}.png", name.to_lowercase())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed brand")
    }

    pub async fn seed_member(&self, name: &str, email: &str) -> member::Model {
        member::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            phone: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed member")
    }

    pub async fn seed_listing(&self, seed: ListingSeed) -> sell_listing::Model {
        let now = Utc::now();
        let mut listing = sell_listing::ActiveModel {
            seller_name: Set("Sam Seller".to_string()),
            seller_email: Set("sam@example.com".to_string()),
            seller_phone: Set(Some("+1-555-0100".to_string())),
            brand_id: Set(None),
            brand_name: Set(seed.brand_name),
            model_name: Set("Civic".to_string()),
            year: Set(2019),
            price: Set(18_500),
            mileage: Set(42_000),
            color: Set(Some("Blue".to_string())),
            interior_color: Set(None),
            fuel_type: Set(Some("Petrol".to_string())),
            transmission: Set(Some("Manual".to_string())),
            body_type: Set(None),
            drivetrain: Set(None),
            engine_size: Set(None),
            horsepower: Set(None),
            torque: Set(None),
            doors: Set(Some(4)),
            seats: Set(Some(5)),
            vin: Set(None),
            condition: Set(Some("Good".to_string())),
            previous_owners: Set(Some(1)),
            registration_year: Set(Some(2019)),
            accident_history: Set(Some(false)),
            service_history: Set(Some(true)),
            fuel_economy: Set(None),
            location: Set(Some("Springfield".to_string())),
            features: Set(None),
            description: Set(seed.description),
            image_url: Set(seed.image_url),
            status: Set(seed.status),
            rejection_reason: Set(None),
            car_id: Set(None),
            member_id: Set(seed.member_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        if let Some(id) = seed.id {
            listing.id = Set(id);
        }
        listing.insert(self.db()).await.expect("seed sell listing")
    }

    pub async fn seed_listing_images(
        &self,
        listing_id: i32,
        urls: &[&str],
    ) -> Vec<sell_listing_image::Model> {
        let mut images = Vec::new();
        for (position, url) in urls.iter().enumerate() {
            let image = sell_listing_image::ActiveModel {
                sell_listing_id: Set(listing_id),
                url: Set(url.to_string()),
                position: Set(position as i32),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(self.db())
            .await
            .expect("seed sell listing image");
            images.push(image);
        }
        images
    }

    pub async fn count<E: EntityTrait>(&self) -> u64
    where
        E::Model: Sync,
    {
        E::find().count(self.db()).await.expect("count rows")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Every editable field with the given brand name
pub fn edited_listing(brand_name: &str) -> Value {
    json!({
        "model": "Civic EX",
        "year": 2019,
        "price": 17900,
        "mileage": 42000,
        "color": "Blue",
        "transmission": "Automatic",
        "doors": 4,
        "seats": 5,
        "description": "Garage kept, one owner, full service history",
        "brandName": brand_name
    })
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is json")
}
