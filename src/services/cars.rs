use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::sync::Arc;
use tracing::instrument;

use crate::{
    config::AppConfig,
    dto::{page_index, page_number, CarDetail, CarListQuery, PaginatedResponse},
    entities::{brand, car, car_image},
    errors::ServiceError,
    tracing::with_metrics,
};

/// Read access to the published car catalog
#[derive(Clone)]
pub struct CarService {
    db: Arc<DatabaseConnection>,
    config: Arc<AppConfig>,
}

impl CarService {
    pub fn new(db: Arc<DatabaseConnection>, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    #[instrument(skip(self))]
    pub async fn list_cars(
        &self,
        query: CarListQuery,
    ) -> Result<PaginatedResponse<car::Model>, ServiceError> {
        let page = page_number(query.page);
        let limit = self.config.page_size(query.limit);
        let index = page_index(page, limit)?;

        with_metrics("car_list", || async {
            let mut select = car::Entity::find();
            if let Some(brand_id) = query.brand_id {
                select = select.filter(car::Column::BrandId.eq(brand_id));
            }
            let paginator = select
                .order_by_desc(car::Column::CreatedAt)
                .order_by_desc(car::Column::Id)
                .paginate(&*self.db, limit);

            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(index).await?;
            Ok::<_, ServiceError>(PaginatedResponse::new(items, total, page, limit))
        })
        .await
    }

    /// A car with its gallery in display order and its brand
    #[instrument(skip(self))]
    pub async fn get_car(&self, car_id: i32) -> Result<CarDetail, ServiceError> {
        let car = car::Entity::find_by_id(car_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("car {} not found", car_id)))?;

        let images = car
            .find_related(car_image::Entity)
            .order_by_asc(car_image::Column::Position)
            .order_by_asc(car_image::Column::Id)
            .all(&*self.db)
            .await?;
        let brand = car.find_related(brand::Entity).one(&*self.db).await?;

        Ok(CarDetail { car, images, brand })
    }
}
