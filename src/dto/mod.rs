pub mod catalog;
pub mod sell_listing;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

pub use catalog::{CarDetail, CarListQuery, CreateBrandRequest};
pub use sell_listing::{
    BrandRef, CreateSellListingRequest, EditableListingFields, EditedListing, ListQuery,
    SellListingDetail, StatusChange, UpdateSellListingStatusRequest,
};

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Body returned by delete endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Pages are 1-based on the wire
pub(crate) fn page_number(requested: Option<u64>) -> u64 {
    requested.unwrap_or(1).max(1)
}

/// Zero-based page index for the paginator. The row offset it implies must
/// fit a signed 64-bit SQL offset.
pub(crate) fn page_index(page: u64, limit: u64) -> Result<u64, ServiceError> {
    let index = page.saturating_sub(1);
    index
        .checked_mul(limit)
        .filter(|offset| *offset <= i64::MAX as u64)
        .map(|_| index)
        .ok_or_else(|| ServiceError::BadRequest(format!("page {} is out of range", page)))
}
