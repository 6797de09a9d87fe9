use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};

use crate::{dto::CreateBrandRequest, entities::brand, errors::ServiceError, AppState};

#[utoipa::path(
    get,
    path = "/api/brands",
    summary = "List brands",
    responses(
        (status = 200, description = "Brands ordered by name", body = Vec<brand::Model>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<Json<Vec<brand::Model>>, ServiceError> {
    Ok(Json(state.services.brands.list_brands().await?))
}

#[utoipa::path(
    post,
    path = "/api/brands",
    summary = "Create brand",
    description = "Names are unique regardless of case; a missing logo gets the placeholder",
    request_body = CreateBrandRequest,
    responses(
        (status = 201, description = "Brand created", body = brand::Model),
        (status = 400, description = "Invalid brand", body = crate::errors::ErrorResponse),
        (status = 409, description = "Brand already exists", body = crate::errors::ErrorResponse),
    ),
    tag = "catalog"
)]
pub async fn create_brand(
    State(state): State<AppState>,
    Json(request): Json<CreateBrandRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let brand = state.services.brands.create_brand(request).await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

pub fn brand_routes() -> Router<AppState> {
    Router::new().route("/", get(list_brands).post(create_brand))
}
