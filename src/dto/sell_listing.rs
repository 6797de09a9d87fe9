use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::entities::{brand, car, member, sell_listing, sell_listing_image};
use crate::entities::{car::CarStatus, sell_listing::ListingStatus};
use crate::errors::ServiceError;

/// Length of the teaser stored on a published car
pub const SHORT_DESCRIPTION_LEN: usize = 150;

/// Every car attribute an administrator may correct before publishing a
/// listing. The same set is captured on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditableListingFields {
    #[serde(rename = "model")]
    #[validate(custom = "not_blank")]
    pub model_name: String,
    #[validate(range(min = 1886, max = 2100))]
    pub year: i32,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(range(min = 0))]
    pub mileage: i32,
    pub color: Option<String>,
    pub interior_color: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub drivetrain: Option<String>,
    pub engine_size: Option<String>,
    #[validate(range(min = 0))]
    pub horsepower: Option<i32>,
    #[validate(range(min = 0))]
    pub torque: Option<i32>,
    #[validate(range(min = 0, max = 10))]
    pub doors: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub seats: Option<i32>,
    pub vin: Option<String>,
    pub condition: Option<String>,
    #[validate(range(min = 0))]
    pub previous_owners: Option<i32>,
    #[validate(range(min = 1886, max = 2100))]
    pub registration_year: Option<i32>,
    pub accident_history: Option<bool>,
    pub service_history: Option<bool>,
    pub fuel_economy: Option<String>,
    pub location: Option<String>,
    pub features: Option<String>,
    pub description: Option<String>,
}

impl EditableListingFields {
    /// Overwrites every editable column of `listing`
    pub fn apply_to_listing(self, listing: &mut sell_listing::ActiveModel) {
        listing.model_name = Set(self.model_name);
        listing.year = Set(self.year);
        listing.price = Set(self.price);
        listing.mileage = Set(self.mileage);
        listing.color = Set(self.color);
        listing.interior_color = Set(self.interior_color);
        listing.fuel_type = Set(self.fuel_type);
        listing.transmission = Set(self.transmission);
        listing.body_type = Set(self.body_type);
        listing.drivetrain = Set(self.drivetrain);
        listing.engine_size = Set(self.engine_size);
        listing.horsepower = Set(self.horsepower);
        listing.torque = Set(self.torque);
        listing.doors = Set(self.doors);
        listing.seats = Set(self.seats);
        listing.vin = Set(self.vin);
        listing.condition = Set(self.condition);
        listing.previous_owners = Set(self.previous_owners);
        listing.registration_year = Set(self.registration_year);
        listing.accident_history = Set(self.accident_history);
        listing.service_history = Set(self.service_history);
        listing.fuel_economy = Set(self.fuel_economy);
        listing.location = Set(self.location);
        listing.features = Set(self.features);
        listing.description = Set(self.description);
    }

    /// A used car carrying these attributes, ready for insertion
    pub fn to_car(&self, brand_id: i32, now: DateTime<Utc>) -> car::ActiveModel {
        car::ActiveModel {
            brand_id: Set(brand_id),
            model_name: Set(self.model_name.clone()),
            year: Set(self.year),
            price: Set(self.price),
            mileage: Set(self.mileage),
            color: Set(self.color.clone()),
            interior_color: Set(self.interior_color.clone()),
            fuel_type: Set(self.fuel_type.clone()),
            transmission: Set(self.transmission.clone()),
            body_type: Set(self.body_type.clone()),
            drivetrain: Set(self.drivetrain.clone()),
            engine_size: Set(self.engine_size.clone()),
            horsepower: Set(self.horsepower),
            torque: Set(self.torque),
            doors: Set(self.doors),
            seats: Set(self.seats),
            vin: Set(self.vin.clone()),
            condition: Set(self.condition.clone()),
            previous_owners: Set(self.previous_owners),
            registration_year: Set(self.registration_year),
            accident_history: Set(self.accident_history),
            service_history: Set(self.service_history),
            fuel_economy: Set(self.fuel_economy.clone()),
            location: Set(self.location.clone()),
            features: Set(self.features.clone()),
            short_description: Set(short_description(self.description.as_deref())),
            description: Set(self.description.clone()),
            status: Set(CarStatus::Used),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }
}

/// First [`SHORT_DESCRIPTION_LEN`] characters of a description
pub fn short_description(description: Option<&str>) -> Option<String> {
    description.map(|d| d.chars().take(SHORT_DESCRIPTION_LEN).collect())
}

/// Brand selection carried by an approval payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandRef {
    Id(i32),
    Name(String),
}

/// Administrator-corrected listing submitted with an approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditedListing {
    #[serde(flatten)]
    #[validate]
    pub fields: EditableListingFields,
    pub brand_id: Option<i32>,
    pub brand_name: Option<String>,
}

impl EditedListing {
    /// `brandId` wins over `brandName`; a blank name counts as absent
    pub fn brand_ref(&self) -> Result<BrandRef, ServiceError> {
        if let Some(id) = self.brand_id {
            return Ok(BrandRef::Id(id));
        }
        self.brand_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| BrandRef::Name(name.to_string()))
            .ok_or_else(|| {
                ServiceError::ValidationError(
                    "approval requires either brandId or brandName".to_string(),
                )
            })
    }
}

/// Body of `PATCH /api/sell-listings/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSellListingStatusRequest {
    pub status: ListingStatus,
    pub rejection_reason: Option<String>,
    /// Corrected listing; may instead be inlined at the top level of the body
    pub edited_listing: Option<EditedListing>,
}

/// A validated status change request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Approve(EditedListing),
    Reject { reason: String },
    Reopen,
    MarkSold,
}

impl StatusChange {
    /// Parses and validates a raw PATCH body. Edited fields are read from
    /// `editedListing` when present, otherwise from the top level.
    pub fn from_body(body: Value) -> Result<Self, ServiceError> {
        let request: UpdateSellListingStatusRequest = serde_json::from_value(body.clone())
            .map_err(|e| ServiceError::BadRequest(format!("invalid status update: {}", e)))?;

        match request.status {
            ListingStatus::Approved => {
                let edited = match request.edited_listing {
                    Some(edited) => edited,
                    None => serde_json::from_value::<EditedListing>(body).map_err(|e| {
                        ServiceError::ValidationError(format!(
                            "approval requires an edited listing: {}",
                            e
                        ))
                    })?,
                };
                edited.validate()?;
                edited.brand_ref()?;
                Ok(StatusChange::Approve(edited))
            }
            ListingStatus::Rejected => request
                .rejection_reason
                .as_deref()
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .map(|reason| StatusChange::Reject {
                    reason: reason.to_string(),
                })
                .ok_or_else(|| {
                    ServiceError::ValidationError(
                        "rejectionReason is required when rejecting a listing".to_string(),
                    )
                }),
            ListingStatus::Pending => Ok(StatusChange::Reopen),
            ListingStatus::Sold => Ok(StatusChange::MarkSold),
        }
    }

    pub fn target_status(&self) -> ListingStatus {
        match self {
            StatusChange::Approve(_) => ListingStatus::Approved,
            StatusChange::Reject { .. } => ListingStatus::Rejected,
            StatusChange::Reopen => ListingStatus::Pending,
            StatusChange::MarkSold => ListingStatus::Sold,
        }
    }
}

/// Body of `POST /api/sell-listings`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSellListingRequest {
    #[validate(custom = "not_blank")]
    pub seller_name: String,
    #[validate(email)]
    pub seller_email: String,
    pub seller_phone: Option<String>,
    pub brand_id: Option<i32>,
    pub brand_name: Option<String>,
    pub member_id: Option<i32>,
    #[serde(flatten)]
    #[validate]
    pub fields: EditableListingFields,
    /// Single image from the legacy submission form
    pub image_url: Option<String>,
    #[serde(default)]
    #[validate(custom = "non_empty_urls")]
    pub images: Vec<String>,
}

impl CreateSellListingRequest {
    /// A pending listing row; images are inserted separately
    pub fn into_active_model(self, now: DateTime<Utc>) -> sell_listing::ActiveModel {
        let mut listing = sell_listing::ActiveModel {
            seller_name: Set(self.seller_name.trim().to_string()),
            seller_email: Set(self.seller_email),
            seller_phone: Set(self.seller_phone),
            brand_id: Set(self.brand_id),
            brand_name: Set(self.brand_name),
            image_url: Set(self.image_url),
            status: Set(ListingStatus::Pending),
            rejection_reason: Set(None),
            car_id: Set(None),
            member_id: Set(self.member_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        self.fields.apply_to_listing(&mut listing);
        listing
    }
}

/// Query string of `GET /api/sell-listings`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Filter by review status
    pub status: Option<ListingStatus>,
    /// Page number (default: 1)
    pub page: Option<u64>,
    /// Items per page
    pub limit: Option<u64>,
}

/// Listing with its images and joined records
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellListingDetail {
    #[serde(flatten)]
    pub listing: sell_listing::Model,
    pub images: Vec<sell_listing_image::Model>,
    pub car: Option<car::Model>,
    pub member: Option<member::Model>,
    pub brand: Option<brand::Model>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn non_empty_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    if urls.iter().any(|url| url.trim().is_empty()) {
        let mut err = ValidationError::new("images");
        err.message = Some("image URLs must not be empty".into());
        return Err(err);
    }
    Ok(())
}
