use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::{brand, car, car_image};

/// Body of `POST /api/brands`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Falls back to the configured placeholder logo
    pub logo_url: Option<String>,
}

/// Query string of `GET /api/cars`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CarListQuery {
    /// Only cars of this brand
    pub brand_id: Option<i32>,
    /// Page number (default: 1)
    pub page: Option<u64>,
    /// Items per page
    pub limit: Option<u64>,
}

/// Published car with its gallery and brand
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarDetail {
    #[serde(flatten)]
    pub car: car::Model,
    pub images: Vec<car_image::Model>,
    pub brand: Option<brand::Model>,
}
