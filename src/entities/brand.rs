use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Car manufacturer. Names are matched case-insensitively by the brand resolver.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "brands")]
#[serde(rename_all = "camelCase")]
#[schema(as = Brand)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Lookup key derived from `name` by [`name_key`]; unique
    #[serde(skip)]
    pub name_key: String,
    pub logo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::car::Entity")]
    Cars,
    #[sea_orm(has_many = "super::sell_listing::Entity")]
    SellListings,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cars.def()
    }
}

impl Related<super::sell_listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellListings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Case-folded form of a brand name. Folding happens here rather than in SQL
/// because SQLite's `LOWER` only handles ASCII.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::name_key;

    #[test]
    fn name_key_folds_non_ascii_case() {
        assert_eq!(name_key("ŠKODA"), name_key("škoda"));
        assert_eq!(name_key("  Citroën "), "citroën");
        assert_ne!(name_key("Mini"), name_key("Mini Cooper"));
    }
}
