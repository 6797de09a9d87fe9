/*!
 * # Listing Approval
 *
 * Publishes a sell listing as a used car in a single database transaction:
 *
 * 1. Load the listing with its images and claim it for approval
 * 2. Resolve the brand (by id, by case-insensitive name, or create it)
 * 3. Insert the car
 * 4. Copy the listing's images into the car gallery
 * 5. Archive the listing as submitted
 * 6. Overwrite the listing with the edited fields and mark it `APPROVED`
 *
 * Any failure rolls the whole transaction back; events are emitted only
 * after commit.
 */

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;
use std::time::Instant;
use strum::Display;
use tracing::{error, info, instrument, warn};

use crate::{
    config::AppConfig,
    dto::{sell_listing::BrandRef, EditedListing, StatusChange},
    entities::{
        brand, car, car_image, sell_listing, sell_listing::ListingStatus, sell_listing_image,
        sell_listing_original,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    metrics::LISTING_METRICS,
    services::brands::resolve_brand,
    services::listing_images::{
        default_image_sources, resolve_image_urls, ImageContext, ImageSources,
    },
};

/// Stage of the approval workflow, used to tag failures in the logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalStep {
    Begin,
    LoadListing,
    ClaimListing,
    ResolveBrand,
    CreateCar,
    CopyImages,
    ArchiveOriginal,
    UpdateListing,
    Commit,
}

trait AtStep<T> {
    fn at_step(self, listing_id: i32, step: ApprovalStep) -> Result<T, ServiceError>;
}

impl<T, E> AtStep<T> for Result<T, E>
where
    E: Into<ServiceError>,
{
    fn at_step(self, listing_id: i32, step: ApprovalStep) -> Result<T, ServiceError> {
        self.map_err(|e| {
            let err = e.into();
            warn!(listing_id, step = %step, error = %err, "Listing approval step failed");
            err
        })
    }
}

/// Everything an approval produced
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub listing: sell_listing::Model,
    pub car: car::Model,
    pub brand: brand::Model,
    pub brand_created: bool,
    pub image_count: usize,
    pub image_source: Option<&'static str>,
}

/// Status transitions of sell listings, including approval
#[derive(Clone)]
pub struct ListingApprovalService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
    image_sources: ImageSources,
}

impl ListingApprovalService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self::with_image_sources(db, event_sender, config, default_image_sources())
    }

    /// Uses a custom image source chain instead of the default one
    pub fn with_image_sources(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
        image_sources: ImageSources,
    ) -> Self {
        Self {
            db,
            event_sender,
            config,
            image_sources,
        }
    }

    /// Applies a validated status change and returns the updated listing
    #[instrument(skip(self, change), fields(target = %change.target_status()))]
    pub async fn update_status(
        &self,
        listing_id: i32,
        change: StatusChange,
    ) -> Result<sell_listing::Model, ServiceError> {
        match change {
            StatusChange::Approve(edited) => Ok(self.approve(listing_id, edited).await?.listing),
            other => self.transition(listing_id, other).await,
        }
    }

    /// Publishes a listing as a car
    #[instrument(skip(self, edited))]
    pub async fn approve(
        &self,
        listing_id: i32,
        edited: EditedListing,
    ) -> Result<ApprovalOutcome, ServiceError> {
        let started = Instant::now();
        let result = self.run_approval(listing_id, edited).await;

        match &result {
            Ok(outcome) => {
                LISTING_METRICS.observe_approval(started.elapsed());
                info!(
                    listing_id,
                    car_id = outcome.car.id,
                    brand_id = outcome.brand.id,
                    brand_created = outcome.brand_created,
                    image_count = outcome.image_count,
                    image_source = outcome.image_source.unwrap_or("none"),
                    "Sell listing approved"
                );
                if outcome.brand_created {
                    self.event_sender
                        .send_or_log(Event::BrandCreated {
                            brand_id: outcome.brand.id,
                            name: outcome.brand.name.clone(),
                        })
                        .await;
                }
                self.event_sender
                    .send_or_log(Event::SellListingApproved {
                        listing_id,
                        car_id: outcome.car.id,
                        brand_id: outcome.brand.id,
                    })
                    .await;
            }
            Err(e) => {
                LISTING_METRICS.record_approval_failure();
                error!(listing_id, error = %e, "Sell listing approval failed");
            }
        }

        result
    }

    async fn run_approval(
        &self,
        listing_id: i32,
        edited: EditedListing,
    ) -> Result<ApprovalOutcome, ServiceError> {
        let brand_ref = edited.brand_ref()?;
        let txn = self
            .db
            .begin()
            .await
            .at_step(listing_id, ApprovalStep::Begin)?;

        match self.approve_in(&txn, listing_id, edited, brand_ref).await {
            Ok(outcome) => {
                txn.commit()
                    .await
                    .at_step(listing_id, ApprovalStep::Commit)?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!(listing_id, error = %rollback_err, "Rollback of listing approval failed");
                }
                Err(e)
            }
        }
    }

    async fn approve_in(
        &self,
        txn: &DatabaseTransaction,
        listing_id: i32,
        edited: EditedListing,
        brand_ref: BrandRef,
    ) -> Result<ApprovalOutcome, ServiceError> {
        let now = Utc::now();

        let (listing, loaded_images) = sell_listing::Entity::find_by_id(listing_id)
            .find_with_related(sell_listing_image::Entity)
            .all(txn)
            .await
            .at_step(listing_id, ApprovalStep::LoadListing)?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("sell listing {} not found", listing_id)))
            .at_step(listing_id, ApprovalStep::LoadListing)?;

        self.claim(txn, &listing, now)
            .await
            .at_step(listing_id, ApprovalStep::ClaimListing)?;

        let (brand, brand_created) = resolve_brand(
            txn,
            &brand_ref,
            &self.config.brand_placeholder_logo_url,
            now,
        )
        .await
        .at_step(listing_id, ApprovalStep::ResolveBrand)?;

        let car = edited
            .fields
            .to_car(brand.id, now)
            .insert(txn)
            .await
            .at_step(listing_id, ApprovalStep::CreateCar)?;

        let ctx = ImageContext {
            listing: &listing,
            loaded_images: &loaded_images,
        };
        let resolved = resolve_image_urls(&self.image_sources, txn, &ctx)
            .await
            .at_step(listing_id, ApprovalStep::CopyImages)?;
        let (urls, image_source) = match resolved {
            Some((urls, source)) => (urls, Some(source)),
            None => {
                warn!(listing_id, "Approving sell listing without any images");
                (Vec::new(), None)
            }
        };
        let image_count = urls.len();
        if !urls.is_empty() {
            let images = urls
                .into_iter()
                .enumerate()
                .map(|(position, url)| car_image::ActiveModel {
                    car_id: Set(car.id),
                    url: Set(url),
                    position: Set(position as i32),
                    created_at: Set(now),
                    ..Default::default()
                });
            car_image::Entity::insert_many(images)
                .exec(txn)
                .await
                .at_step(listing_id, ApprovalStep::CopyImages)?;
        }

        archive_original(&listing, &brand, car.id, now)
            .insert(txn)
            .await
            .at_step(listing_id, ApprovalStep::ArchiveOriginal)?;

        let mut active: sell_listing::ActiveModel = listing.into();
        edited.fields.apply_to_listing(&mut active);
        active.brand_id = Set(Some(brand.id));
        active.brand_name = Set(Some(brand.name.clone()));
        active.status = Set(ListingStatus::Approved);
        active.rejection_reason = Set(None);
        active.car_id = Set(Some(car.id));
        active.updated_at = Set(now);
        let listing = active
            .update(txn)
            .await
            .at_step(listing_id, ApprovalStep::UpdateListing)?;

        Ok(ApprovalOutcome {
            listing,
            car,
            brand,
            brand_created,
            image_count,
            image_source,
        })
    }

    /// Checks the transition and marks the row approved inside the
    /// transaction so a concurrent approval of the same listing matches no
    /// rows and fails with a conflict.
    async fn claim(
        &self,
        txn: &DatabaseTransaction,
        listing: &sell_listing::Model,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if listing.status == ListingStatus::Approved {
            if self.config.allow_reapproval {
                return Ok(());
            }
            return Err(ServiceError::Conflict(format!(
                "sell listing {} is already APPROVED",
                listing.id
            )));
        }
        if !listing.status.can_transition_to(ListingStatus::Approved) {
            return Err(ServiceError::Conflict(format!(
                "sell listing {} cannot move from {} to APPROVED",
                listing.id, listing.status
            )));
        }

        let claimed = sell_listing::Entity::update_many()
            .col_expr(
                sell_listing::Column::Status,
                Expr::value(ListingStatus::Approved),
            )
            .col_expr(sell_listing::Column::UpdatedAt, Expr::value(now))
            .filter(sell_listing::Column::Id.eq(listing.id))
            .filter(sell_listing::Column::Status.eq(listing.status))
            .exec(txn)
            .await?;

        if claimed.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "sell listing {} was modified concurrently",
                listing.id
            )));
        }
        Ok(())
    }

    /// Moves a listing to any status other than `APPROVED`
    #[instrument(skip(self, change))]
    pub async fn transition(
        &self,
        listing_id: i32,
        change: StatusChange,
    ) -> Result<sell_listing::Model, ServiceError> {
        let target = change.target_status();
        let listing = sell_listing::Entity::find_by_id(listing_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("sell listing {} not found", listing_id))
            })?;

        if !listing.status.can_transition_to(target) {
            return Err(ServiceError::Conflict(format!(
                "sell listing {} cannot move from {} to {}",
                listing_id, listing.status, target
            )));
        }

        let mut update = sell_listing::Entity::update_many()
            .col_expr(sell_listing::Column::Status, Expr::value(target))
            .col_expr(sell_listing::Column::UpdatedAt, Expr::value(Utc::now()));
        let reason = match &change {
            StatusChange::Reject { reason } => {
                update = update.col_expr(
                    sell_listing::Column::RejectionReason,
                    Expr::value(reason.clone()),
                );
                Some(reason.clone())
            }
            _ => None,
        };

        // Guarded on the status read above; losing a race is a conflict.
        let result = update
            .filter(sell_listing::Column::Id.eq(listing_id))
            .filter(sell_listing::Column::Status.eq(listing.status))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "sell listing {} was modified concurrently",
                listing_id
            )));
        }

        let updated = sell_listing::Entity::find_by_id(listing_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("sell listing {} not found", listing_id))
            })?;

        info!(listing_id, from = %listing.status, to = %target, "Sell listing status changed");
        let event = match reason {
            Some(reason) => Event::SellListingRejected { listing_id, reason },
            None => Event::SellListingStatusChanged {
                listing_id,
                old_status: listing.status,
                new_status: target,
            },
        };
        self.event_sender.send_or_log(event).await;

        Ok(updated)
    }
}

/// Snapshot of the listing as submitted, published under the resolved brand
fn archive_original(
    listing: &sell_listing::Model,
    brand: &brand::Model,
    car_id: i32,
    now: DateTime<Utc>,
) -> sell_listing_original::ActiveModel {
    let listing = listing.clone();
    sell_listing_original::ActiveModel {
        sell_listing_id: Set(Some(listing.id)),
        car_id: Set(car_id),
        seller_name: Set(listing.seller_name),
        seller_email: Set(listing.seller_email),
        seller_phone: Set(listing.seller_phone),
        brand_name: Set(brand.name.clone()),
        model_name: Set(listing.model_name),
        year: Set(listing.year),
        price: Set(listing.price),
        mileage: Set(listing.mileage),
        color: Set(listing.color),
        interior_color: Set(listing.interior_color),
        fuel_type: Set(listing.fuel_type),
        transmission: Set(listing.transmission),
        body_type: Set(listing.body_type),
        drivetrain: Set(listing.drivetrain),
        engine_size: Set(listing.engine_size),
        horsepower: Set(listing.horsepower),
        torque: Set(listing.torque),
        doors: Set(listing.doors),
        seats: Set(listing.seats),
        vin: Set(listing.vin),
        condition: Set(listing.condition),
        previous_owners: Set(listing.previous_owners),
        registration_year: Set(listing.registration_year),
        accident_history: Set(listing.accident_history),
        service_history: Set(listing.service_history),
        fuel_economy: Set(listing.fuel_economy),
        location: Set(listing.location),
        features: Set(listing.features),
        description: Set(listing.description),
        image_url: Set(listing.image_url),
        status: Set(ListingStatus::Approved),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}
