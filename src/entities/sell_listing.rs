use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Seller-submitted draft of a car for sale, pending dealership review.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "sell_listings")]
#[serde(rename_all = "camelCase")]
#[schema(as = SellListing)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub seller_name: String,
    pub seller_email: String,
    pub seller_phone: Option<String>,
    pub brand_id: Option<i32>,
    pub brand_name: Option<String>,
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
    /// Single image from the pre-gallery submission form
    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,
    pub status: ListingStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,
    pub car_id: Option<i32>,
    pub member_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sell_listing_image::Entity")]
    SellListingImages,
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::Id"
    )]
    Brand,
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id"
    )]
    Car,
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
}

impl Related<super::sell_listing_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellListingImages.def()
    }
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Review state of a sell listing
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
pub enum ListingStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "SOLD")]
    Sold,
}

impl ListingStatus {
    /// Whether a listing currently in `self` may move to `next`.
    ///
    /// Re-approving an approved listing is not a transition; the approval
    /// workflow decides that case from its re-approval policy.
    pub fn can_transition_to(self, next: ListingStatus) -> bool {
        use ListingStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Rejected, Pending)
                | (Rejected, Approved)
                | (Approved, Sold)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ListingStatus::{self, *};
    use rstest::rstest;

    #[rstest]
    #[case(Pending, Approved)]
    #[case(Pending, Rejected)]
    #[case(Rejected, Pending)]
    #[case(Rejected, Approved)]
    #[case(Approved, Sold)]
    fn allowed_transitions(#[case] from: ListingStatus, #[case] to: ListingStatus) {
        assert!(from.can_transition_to(to));
    }

    #[rstest]
    #[case(Pending, Sold)]
    #[case(Pending, Pending)]
    #[case(Approved, Approved)]
    #[case(Approved, Rejected)]
    #[case(Approved, Pending)]
    #[case(Sold, Approved)]
    #[case(Sold, Pending)]
    #[case(Rejected, Sold)]
    fn rejected_transitions(#[case] from: ListingStatus, #[case] to: ListingStatus) {
        assert!(!from.can_transition_to(to));
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Approved).unwrap(), "\"APPROVED\"");
        assert_eq!(Rejected.to_string(), "REJECTED");
        let parsed: ListingStatus = serde_json::from_str("\"SOLD\"").unwrap();
        assert_eq!(parsed, Sold);
    }
}
