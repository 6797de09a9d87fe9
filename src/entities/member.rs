use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "members")]
#[serde(rename_all = "camelCase")]
#[schema(as = Member)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sell_listing::Entity")]
    SellListings,
}

impl Related<super::sell_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellListings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
