use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dealership API",
        version = "0.1.0",
        description = r#"
# Dealership Back-Office API

Review queue for cars offered by private sellers, and the catalog of cars the
dealership publishes.

## Features

- **Sell Listings**: Submit, list, inspect and delete seller submissions
- **Approval**: Publish a listing as a used car in one atomic step, with
  brand resolution, gallery copy and an archived snapshot of the submission
- **Catalog**: Brands and published cars

## Status Transitions

`PENDING → APPROVED | REJECTED`, `REJECTED → PENDING | APPROVED`,
`APPROVED → SOLD`. Anything else answers `409 Conflict`.

## Error Handling

Every failing route answers with:

```json
{
  "error": "Conflict: sell listing 42 is already APPROVED",
  "requestId": "req-abc123xyz",
  "timestamp": "2024-12-09T10:30:00.000Z"
}
```

## Pagination

List endpoints accept `page` (1-based) and `limit` and answer with
`{ items, total, page, limit, totalPages }`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "sell-listings", description = "Seller submissions and their review"),
        (name = "catalog", description = "Brands and published cars")
    ),
    paths(
        // Sell listings
        crate::handlers::sell_listings::list_sell_listings,
        crate::handlers::sell_listings::create_sell_listing,
        crate::handlers::sell_listings::get_sell_listing,
        crate::handlers::sell_listings::update_sell_listing_status,
        crate::handlers::sell_listings::delete_sell_listing,

        // Catalog
        crate::handlers::brands::list_brands,
        crate::handlers::brands::create_brand,
        crate::handlers::cars::list_cars,
        crate::handlers::cars::get_car,
    ),
    components(
        schemas(
            crate::dto::EditableListingFields,
            crate::dto::EditedListing,
            crate::dto::UpdateSellListingStatusRequest,
            crate::dto::CreateSellListingRequest,
            crate::dto::SellListingDetail,
            crate::dto::CreateBrandRequest,
            crate::dto::CarDetail,
            crate::dto::DeleteResponse,
            crate::entities::sell_listing::ListingStatus,
            crate::entities::car::CarStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_listing_routes() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Dealership API"));
        assert!(json.contains("/api/sell-listings/{id}"));
        assert!(json.contains("/api/cars"));
        assert!(json.contains("ErrorResponse"));
    }
}
