// Catalog
pub mod brands;
pub mod cars;

// Sell listing review
pub mod listing_approval;
pub mod listing_images;
pub mod sell_listings;
