use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::{sell_listing, sell_listing_image};

/// What an image source may look at when resolving a listing's images
pub struct ImageContext<'a> {
    pub listing: &'a sell_listing::Model,
    /// Images loaded together with the listing
    pub loaded_images: &'a [sell_listing_image::Model],
}

/// One provider of image URLs for a listing being approved
#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn image_urls(
        &self,
        txn: &DatabaseTransaction,
        ctx: &ImageContext<'_>,
    ) -> Result<Vec<String>, DbErr>;
}

/// Ordered list of sources; the first non-empty answer wins
pub type ImageSources = Arc<Vec<Box<dyn ImageSource>>>;

/// Queries `sell_listing_images` by listing id
pub struct DirectQuerySource;

/// Uses the relation loaded with the listing
pub struct LoadedRelationSource;

/// Falls back to the single `imageUrl` column of old submissions
pub struct LegacyFieldSource;

#[async_trait]
impl ImageSource for DirectQuerySource {
    fn name(&self) -> &'static str {
        "direct_query"
    }

    async fn image_urls(
        &self,
        txn: &DatabaseTransaction,
        ctx: &ImageContext<'_>,
    ) -> Result<Vec<String>, DbErr> {
        let images = fetch_listing_images(txn, ctx.listing.id).await?;
        Ok(images.into_iter().map(|image| image.url).collect())
    }
}

#[async_trait]
impl ImageSource for LoadedRelationSource {
    fn name(&self) -> &'static str {
        "loaded_relation"
    }

    async fn image_urls(
        &self,
        _txn: &DatabaseTransaction,
        ctx: &ImageContext<'_>,
    ) -> Result<Vec<String>, DbErr> {
        let mut images = ctx.loaded_images.to_vec();
        sort_images(&mut images);
        Ok(images.into_iter().map(|image| image.url).collect())
    }
}

#[async_trait]
impl ImageSource for LegacyFieldSource {
    fn name(&self) -> &'static str {
        "legacy_field"
    }

    async fn image_urls(
        &self,
        _txn: &DatabaseTransaction,
        ctx: &ImageContext<'_>,
    ) -> Result<Vec<String>, DbErr> {
        Ok(ctx
            .listing
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| vec![url.to_string()])
            .unwrap_or_default())
    }
}

/// Direct query, then loaded relation, then legacy field
pub fn default_image_sources() -> ImageSources {
    Arc::new(vec![
        Box::new(DirectQuerySource),
        Box::new(LoadedRelationSource),
        Box::new(LegacyFieldSource),
    ])
}

/// Asks each source in order and returns the first non-empty URL list with
/// the name of the source that produced it
pub async fn resolve_image_urls(
    sources: &[Box<dyn ImageSource>],
    txn: &DatabaseTransaction,
    ctx: &ImageContext<'_>,
) -> Result<Option<(Vec<String>, &'static str)>, DbErr> {
    for source in sources {
        let urls = source.image_urls(txn, ctx).await?;
        debug!(
            listing_id = ctx.listing.id,
            source = source.name(),
            count = urls.len(),
            "Image source consulted"
        );
        if !urls.is_empty() {
            return Ok(Some((urls, source.name())));
        }
    }
    Ok(None)
}

/// Images of a listing ordered by position, then id
pub async fn fetch_listing_images<C: ConnectionTrait>(
    conn: &C,
    listing_id: i32,
) -> Result<Vec<sell_listing_image::Model>, DbErr> {
    sell_listing_image::Entity::find()
        .filter(sell_listing_image::Column::SellListingId.eq(listing_id))
        .order_by_asc(sell_listing_image::Column::Position)
        .order_by_asc(sell_listing_image::Column::Id)
        .all(conn)
        .await
}

pub(crate) fn sort_images(images: &mut [sell_listing_image::Model]) {
    images.sort_by_key(|image| (image.position, image.id));
}
