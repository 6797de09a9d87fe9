use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::sell_listing::ListingStatus;

/// Archival snapshot of a listing as the seller submitted it, written once at
/// approval time and never updated.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "sell_listing_originals")]
#[serde(rename_all = "camelCase")]
#[schema(as = SellListingOriginal)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sell_listing_id: Option<i32>,
    pub car_id: i32,
    pub seller_name: String,
    pub seller_email: String,
    pub seller_phone: Option<String>,
    pub brand_name: String,
    #[sea_orm(column_name = "model")]
    #[serde(rename = "model")]
    pub model_name: String,
    pub year: i32,
    pub price: i64,
    pub mileage: i32,
    pub color: Option<String>,
    pub interior_color: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub body_type: Option<String>,
    pub drivetrain: Option<String>,
    pub engine_size: Option<String>,
    pub horsepower: Option<i32>,
    pub torque: Option<i32>,
    pub doors: Option<i32>,
    pub seats: Option<i32>,
    pub vin: Option<String>,
    pub condition: Option<String>,
    pub previous_owners: Option<i32>,
    pub registration_year: Option<i32>,
    pub accident_history: Option<bool>,
    pub service_history: Option<bool>,
    pub fuel_economy: Option<String>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub features: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id"
    )]
    Car,
    #[sea_orm(
        belongs_to = "super::sell_listing::Entity",
        from = "Column::SellListingId",
        to = "super::sell_listing::Column::Id",
        on_delete = "SetNull"
    )]
    SellListing,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<super::sell_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellListing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
