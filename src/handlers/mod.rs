pub mod brands;
pub mod cars;
pub mod sell_listings;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    brands::BrandService, cars::CarService, listing_approval::ListingApprovalService,
    sell_listings::SellListingService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub sell_listings: Arc<SellListingService>,
    pub listing_approval: Arc<ListingApprovalService>,
    pub brands: Arc<BrandService>,
    pub cars: Arc<CarService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            sell_listings: Arc::new(SellListingService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.clone(),
            )),
            listing_approval: Arc::new(ListingApprovalService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.clone(),
            )),
            brands: Arc::new(BrandService::new(
                db_pool.clone(),
                event_sender,
                config.clone(),
            )),
            cars: Arc::new(CarService::new(db_pool, config)),
        }
    }
}
