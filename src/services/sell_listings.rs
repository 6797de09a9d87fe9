use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    config::AppConfig,
    dto::{
        page_index, page_number, CreateSellListingRequest, ListQuery, PaginatedResponse,
        SellListingDetail,
    },
    entities::{brand, car, member, sell_listing, sell_listing_image},
    errors::ServiceError,
    events::{Event, EventSender},
    services::listing_images::{fetch_listing_images, sort_images},
    tracing::with_metrics,
};

/// Submission, review queue and removal of sell listings
#[derive(Clone)]
pub struct SellListingService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

impl SellListingService {
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

    /// Stores a new `PENDING` listing with its images
    #[instrument(skip(self, request))]
    pub async fn create_listing(
        &self,
        request: CreateSellListingRequest,
    ) -> Result<SellListingDetail, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let urls: Vec<String> = request
            .images
            .iter()
            .map(|url| url.trim().to_string())
            .collect();

        let txn = self.db.begin().await?;
        let listing = request.into_active_model(now).insert(&txn).await?;
        if !urls.is_empty() {
            let images = urls
                .iter()
                .enumerate()
                .map(|(position, url)| sell_listing_image::ActiveModel {
                    sell_listing_id: Set(listing.id),
                    url: Set(url.clone()),
                    position: Set(position as i32),
                    created_at: Set(now),
                    ..Default::default()
                });
            sell_listing_image::Entity::insert_many(images)
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        info!(listing_id = listing.id, image_count = urls.len(), "Sell listing submitted");
        self.event_sender
            .send_or_log(Event::SellListingSubmitted {
                listing_id: listing.id,
                image_count: urls.len(),
            })
            .await;

        self.get_listing(listing.id).await
    }

    /// Newest first, optionally filtered by status
    #[instrument(skip(self))]
    pub async fn list_listings(
        &self,
        query: ListQuery,
    ) -> Result<PaginatedResponse<sell_listing::Model>, ServiceError> {
        let page = page_number(query.page);
        let limit = self.config.page_size(query.limit);
        let index = page_index(page, limit)?;

        with_metrics("sell_listing_list", || async {
            let mut select = sell_listing::Entity::find();
            if let Some(status) = query.status {
                select = select.filter(sell_listing::Column::Status.eq(status));
            }
            let paginator = select
                .order_by_desc(sell_listing::Column::CreatedAt)
                .order_by_desc(sell_listing::Column::Id)
                .paginate(&*self.db, limit);

            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(index).await?;
            Ok::<_, ServiceError>(PaginatedResponse::new(items, total, page, limit))
        })
        .await
    }

    /// A listing with its ordered images, published car, member and brand.
    ///
    /// When the relation comes back empty the images are queried directly by
    /// listing id, and a repaired read is logged.
    #[instrument(skip(self))]
    pub async fn get_listing(&self, listing_id: i32) -> Result<SellListingDetail, ServiceError> {
        with_metrics("sell_listing_get", || async {
            let listing = self.find_listing(listing_id).await?;

            let mut images = listing
                .find_related(sell_listing_image::Entity)
                .all(&*self.db)
                .await?;
            sort_images(&mut images);
            if images.is_empty() {
                images = fetch_listing_images(&*self.db, listing_id).await?;
                if !images.is_empty() {
                    warn!(
                        listing_id,
                        count = images.len(),
                        "Listing images missing from relation load; recovered by direct query"
                    );
                }
            }

            let car = match listing.car_id {
                Some(id) => car::Entity::find_by_id(id).one(&*self.db).await?,
                None => None,
            };
            let member = match listing.member_id {
                Some(id) => member::Entity::find_by_id(id).one(&*self.db).await?,
                None => None,
            };
            let brand = match listing.brand_id {
                Some(id) => brand::Entity::find_by_id(id).one(&*self.db).await?,
                None => None,
            };

            Ok::<_, ServiceError>(SellListingDetail {
                listing,
                images,
                car,
                member,
                brand,
            })
        })
        .await
    }

    /// Removes a listing and its images. A published car and its archived
    /// original are left in place.
    #[instrument(skip(self))]
    pub async fn delete_listing(&self, listing_id: i32) -> Result<(), ServiceError> {
        self.find_listing(listing_id).await?;

        match sell_listing_image::Entity::delete_many()
            .filter(sell_listing_image::Column::SellListingId.eq(listing_id))
            .exec(&*self.db)
            .await
        {
            Ok(result) => info!(
                listing_id,
                removed = result.rows_affected,
                "Deleted sell listing images"
            ),
            Err(e) => warn!(
                listing_id,
                error = %e,
                "Failed to delete sell listing images; continuing with listing"
            ),
        }

        let result = sell_listing::Entity::delete_by_id(listing_id)
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "sell listing {} not found",
                listing_id
            )));
        }

        info!(listing_id, "Sell listing deleted");
        self.event_sender
            .send_or_log(Event::SellListingDeleted(listing_id))
            .await;
        Ok(())
    }

    async fn find_listing(&self, listing_id: i32) -> Result<sell_listing::Model, ServiceError> {
        sell_listing::Entity::find_by_id(listing_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("sell listing {} not found", listing_id)))
    }
}
