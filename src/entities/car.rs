use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Publicly listed vehicle. Rows are only created by the listing approval workflow.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "cars")]
#[serde(rename_all = "camelCase")]
#[schema(as = Car)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand_id: i32,
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
    pub short_description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: CarStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id"
    )]
    Brand,
    #[sea_orm(has_many = "super::car_image::Entity")]
    CarImages,
    #[sea_orm(has_many = "super::sell_listing_original::Entity")]
    SellListingOriginals,
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::car_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarImages.def()
    }
}

impl Related<super::sell_listing_original::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellListingOriginals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Inventory condition of a published car
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    #[sea_orm(string_value = "NEW")]
    New,
    #[sea_orm(string_value = "USED")]
    Used,
}
