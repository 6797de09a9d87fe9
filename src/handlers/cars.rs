use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::{
    dto::{CarDetail, CarListQuery, PaginatedResponse},
    entities::car,
    errors::ServiceError,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/cars",
    summary = "List cars",
    description = "Published cars, newest first",
    params(CarListQuery),
    responses(
        (status = 200, description = "Cars retrieved successfully", body = PaginatedResponse<car::Model>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<CarListQuery>,
) -> Result<Json<PaginatedResponse<car::Model>>, ServiceError> {
    Ok(Json(state.services.cars.list_cars(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    summary = "Get car",
    params(("id" = i32, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Car with gallery and brand", body = CarDetail),
        (status = 404, description = "Car not found", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CarDetail>, ServiceError> {
    Ok(Json(state.services.cars.get_car(id).await?))
}

pub fn car_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars))
        .route("/:id", get(get_car))
}
