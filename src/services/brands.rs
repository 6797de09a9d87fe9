use chrono::{DateTime, Utc};
use sea_orm::error::SqlErr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    config::AppConfig,
    dto::{sell_listing::BrandRef, CreateBrandRequest},
    entities::brand,
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Brand catalog operations
#[derive(Clone)]
pub struct BrandService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

impl BrandService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            db,
            event_sender,
            config,
        }
    }

    /// All brands ordered by name
    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<brand::Model>, ServiceError> {
        let brands = brand::Entity::find()
            .order_by_asc(brand::Column::Name)
            .order_by_asc(brand::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(brands)
    }

    /// Creates a brand. Names are unique regardless of case.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_brand(
        &self,
        request: CreateBrandRequest,
    ) -> Result<brand::Model, ServiceError> {
        request.validate()?;
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "brand name must not be blank".to_string(),
            ));
        }

        if let Some(existing) = find_by_name(&*self.db, &name).await? {
            return Err(ServiceError::Conflict(format!(
                "brand '{}' already exists with id {}",
                existing.name, existing.id
            )));
        }

        let logo_url = request
            .logo_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.config.brand_placeholder_logo_url.clone());
        let brand = insert_brand(&*self.db, &name, &logo_url, Utc::now()).await?;

        info!(brand_id = brand.id, "Brand created");
        self.event_sender
            .send_or_log(Event::BrandCreated {
                brand_id: brand.id,
                name: brand.name.clone(),
            })
            .await;

        Ok(brand)
    }
}

/// Case-insensitive lookup by name
pub async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<brand::Model>, ServiceError> {
    let brand = brand::Entity::find()
        .filter(brand::Column::NameKey.eq(brand::name_key(name)))
        .one(conn)
        .await?;
    Ok(brand)
}

async fn insert_brand<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    logo_url: &str,
    now: DateTime<Utc>,
) -> Result<brand::Model, ServiceError> {
    brand::ActiveModel {
        name: Set(name.to_string()),
        name_key: Set(brand::name_key(name)),
        logo_url: Set(logo_url.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|err| match err.sql_err() {
        // Another request created the same brand after our lookup
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(format!("brand '{}' already exists", name))
        }
        _ => err.into(),
    })
}

/// Resolves the brand an approved listing is published under. An explicit id
/// must exist; a name is matched case-insensitively and created with the
/// placeholder logo when unknown. Returns whether the brand was created.
pub async fn resolve_brand<C: ConnectionTrait>(
    conn: &C,
    brand_ref: &BrandRef,
    placeholder_logo_url: &str,
    now: DateTime<Utc>,
) -> Result<(brand::Model, bool), ServiceError> {
    match brand_ref {
        BrandRef::Id(id) => brand::Entity::find_by_id(*id)
            .one(conn)
            .await?
            .map(|brand| (brand, false))
            .ok_or_else(|| ServiceError::ValidationError(format!("brand {} does not exist", id))),
        BrandRef::Name(name) => {
            if let Some(existing) = find_by_name(conn, name).await? {
                return Ok((existing, false));
            }
            let created = insert_brand(conn, name.trim(), placeholder_logo_url, now).await?;
            info!(brand_id = created.id, name = %created.name, "Created brand during approval");
            Ok((created, true))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection, run_migrations};
    use assert_matches::assert_matches;

    async fn test_db() -> DatabaseConnection {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn name_lookup_ignores_case() {
        let db = test_db().await;
        insert_brand(&db, "Toyota", "https://logo/toyota.png", Utc::now())
            .await
            .unwrap();

        let (brand, created) = resolve_brand(
            &db,
            &BrandRef::Name("toyota".into()),
            "https://placeholder",
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(!created);
        assert_eq!(brand.name, "Toyota");
        assert_eq!(brand.logo_url, "https://logo/toyota.png");
    }

    #[tokio::test]
    async fn name_lookup_folds_non_ascii_case() {
        let db = test_db().await;
        insert_brand(&db, "ŠKODA", "https://logo/skoda.png", Utc::now())
            .await
            .unwrap();

        let (brand, created) = resolve_brand(
            &db,
            &BrandRef::Name("škoda".into()),
            "https://placeholder",
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(!created);
        assert_eq!(brand.name, "ŠKODA");
        assert_eq!(brand::Entity::find().all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let db = test_db().await;
        insert_brand(&db, "Citroën", "https://logo/c.png", Utc::now())
            .await
            .unwrap();
        let result = insert_brand(&db, "CITROËN", "https://logo/c.png", Utc::now()).await;
        assert_matches!(result, Err(ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_name_is_created_with_placeholder_logo() {
        let db = test_db().await;
        let (brand, created) = resolve_brand(
            &db,
            &BrandRef::Name("Acme".into()),
            "https://placeholder",
            Utc::now(),
        )
        .await
        .unwrap();
        assert!(created);
        assert_eq!(brand.name, "Acme");
        assert_eq!(brand.logo_url, "https://placeholder");
    }

    #[tokio::test]
    async fn unknown_id_is_a_validation_error() {
        let db = test_db().await;
        let result = resolve_brand(&db, &BrandRef::Id(999), "https://placeholder", Utc::now()).await;
        assert_matches!(result, Err(ServiceError::ValidationError(_)));
    }
}
