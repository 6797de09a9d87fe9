use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Photo attached to a sell listing at submission time. Rows are never updated.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "sell_listing_images")]
#[serde(rename_all = "camelCase")]
#[schema(as = SellListingImage)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sell_listing_id: i32,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sell_listing::Entity",
        from = "Column::SellListingId",
        to = "super::sell_listing::Column::Id",
        on_delete = "Cascade"
    )]
    SellListing,
}

impl Related<super::sell_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellListing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
