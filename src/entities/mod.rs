pub mod brand;
pub mod car;
pub mod car_image;
pub mod member;
pub mod sell_listing;
pub mod sell_listing_image;
pub mod sell_listing_original;

// Re-export entities
pub use brand::{Entity as Brand, Model as BrandModel};
pub use car::{CarStatus, Entity as Car, Model as CarModel};
pub use car_image::{Entity as CarImage, Model as CarImageModel};
pub use member::{Entity as Member, Model as MemberModel};
pub use sell_listing::{Entity as SellListing, ListingStatus, Model as SellListingModel};
pub use sell_listing_image::{Entity as SellListingImage, Model as SellListingImageModel};
pub use sell_listing_original::{
    Entity as SellListingOriginal, Model as SellListingOriginalModel,
};
