use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::Value;

use crate::{
    dto::{
        CreateSellListingRequest, DeleteResponse, ListQuery, PaginatedResponse,
        SellListingDetail, StatusChange, UpdateSellListingStatusRequest,
    },
    entities::sell_listing,
    errors::ServiceError,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/sell-listings",
    summary = "List sell listings",
    description = "Review queue of sell listings, newest first",
    params(ListQuery),
    responses(
        (status = 200, description = "Listings retrieved successfully", body = PaginatedResponse<sell_listing::Model>),
        (status = 400, description = "Invalid query parameters", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "sell-listings"
)]
pub async fn list_sell_listings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<sell_listing::Model>>, ServiceError> {
    let page = state.services.sell_listings.list_listings(query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/sell-listings",
    summary = "Submit sell listing",
    description = "Stores a seller's submission as a PENDING listing together with its images",
    request_body = CreateSellListingRequest,
    responses(
        (status = 201, description = "Listing submitted", body = SellListingDetail,
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 400, description = "Invalid listing", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "sell-listings"
)]
pub async fn create_sell_listing(
    State(state): State<AppState>,
    Json(request): Json<CreateSellListingRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.sell_listings.create_listing(request).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/sell-listings/{id}",
    summary = "Get sell listing",
    description = "A listing with its images, published car, member and brand",
    params(("id" = i32, Path, description = "Sell listing ID")),
    responses(
        (status = 200, description = "Listing retrieved successfully", body = SellListingDetail),
        (status = 404, description = "Listing not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "sell-listings"
)]
pub async fn get_sell_listing(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SellListingDetail>, ServiceError> {
    let detail = state.services.sell_listings.get_listing(id).await?;
    Ok(Json(detail))
}

/// The body is taken as raw JSON because the edited listing may be nested
/// under `editedListing` or inlined next to `status`.
#[utoipa::path(
    patch,
    path = "/api/sell-listings/{id}",
    summary = "Change sell listing status",
    description = "Approves (publishing a car), rejects, reopens or marks a listing as sold",
    params(("id" = i32, Path, description = "Sell listing ID")),
    request_body = UpdateSellListingStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = sell_listing::Model),
        (status = 400, description = "Invalid status change", body = crate::errors::ErrorResponse),
        (status = 404, description = "Listing not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Transition not allowed or already approved", body = crate::errors::ErrorResponse),
        (status = 500, description = "Approval failed and was rolled back", body = crate::errors::ErrorResponse),
    ),
    tag = "sell-listings"
)]
pub async fn update_sell_listing_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> Result<Json<sell_listing::Model>, ServiceError> {
    let change = StatusChange::from_body(body)?;
    let listing = state
        .services
        .listing_approval
        .update_status(id, change)
        .await?;
    Ok(Json(listing))
}

#[utoipa::path(
    delete,
    path = "/api/sell-listings/{id}",
    summary = "Delete sell listing",
    description = "Removes a listing and its images; a published car is kept",
    params(("id" = i32, Path, description = "Sell listing ID")),
    responses(
        (status = 200, description = "Listing deleted", body = DeleteResponse),
        (status = 404, description = "Listing not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "sell-listings"
)]
pub async fn delete_sell_listing(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteResponse>, ServiceError> {
    state.services.sell_listings.delete_listing(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

pub fn sell_listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sell_listings).post(create_sell_listing))
        .route(
            "/:id",
            get(get_sell_listing)
                .patch(update_sell_listing_status)
                .delete(delete_sell_listing),
        )
}
