use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_brands_table::Migration),
            Box::new(m20240301_000002_create_members_table::Migration),
            Box::new(m20240301_000003_create_cars_table::Migration),
            Box::new(m20240301_000004_create_car_images_table::Migration),
            Box::new(m20240301_000005_create_sell_listings_table::Migration),
            Box::new(m20240301_000006_create_sell_listing_images_table::Migration),
            Box::new(m20240301_000007_create_sell_listing_originals_table::Migration),
        ]
    }
}

/// Vehicle attribute columns shared by cars, sell listings and their
/// archival snapshots.
mod vehicle {
    use sea_orm_migration::prelude::*;

    #[derive(DeriveIden)]
    pub enum Vehicle {
        Model,
        Year,
        Price,
        Mileage,
        Color,
        InteriorColor,
        FuelType,
        Transmission,
        BodyType,
        Drivetrain,
        EngineSize,
        Horsepower,
        Torque,
        Doors,
        Seats,
        Vin,
        Condition,
        PreviousOwners,
        RegistrationYear,
        AccidentHistory,
        ServiceHistory,
        FuelEconomy,
        Location,
        Features,
        Description,
    }

    pub fn columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
        table
            .col(ColumnDef::new(Vehicle::Model).string().not_null())
            .col(ColumnDef::new(Vehicle::Year).integer().not_null())
            .col(ColumnDef::new(Vehicle::Price).big_integer().not_null())
            .col(ColumnDef::new(Vehicle::Mileage).integer().not_null())
            .col(ColumnDef::new(Vehicle::Color).string().null())
            .col(ColumnDef::new(Vehicle::InteriorColor).string().null())
            .col(ColumnDef::new(Vehicle::FuelType).string().null())
            .col(ColumnDef::new(Vehicle::Transmission).string().null())
            .col(ColumnDef::new(Vehicle::BodyType).string().null())
            .col(ColumnDef::new(Vehicle::Drivetrain).string().null())
            .col(ColumnDef::new(Vehicle::EngineSize).string().null())
            .col(ColumnDef::new(Vehicle::Horsepower).integer().null())
            .col(ColumnDef::new(Vehicle::Torque).integer().null())
            .col(ColumnDef::new(Vehicle::Doors).integer().null())
            .col(ColumnDef::new(Vehicle::Seats).integer().null())
            .col(ColumnDef::new(Vehicle::Vin).string().null())
            .col(ColumnDef::new(Vehicle::Condition).string().null())
            .col(ColumnDef::new(Vehicle::PreviousOwners).integer().null())
            .col(ColumnDef::new(Vehicle::RegistrationYear).integer().null())
            .col(ColumnDef::new(Vehicle::AccidentHistory).boolean().null())
            .col(ColumnDef::new(Vehicle::ServiceHistory).boolean().null())
            .col(ColumnDef::new(Vehicle::FuelEconomy).string().null())
            .col(ColumnDef::new(Vehicle::Location).string().null())
            .col(ColumnDef::new(Vehicle::Features).text().null())
            .col(ColumnDef::new(Vehicle::Description).text().null())
    }
}

mod m20240301_000001_create_brands_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_brands_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Brands::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Brands::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Brands::Name).string().not_null())
                        .col(ColumnDef::new(Brands::NameKey).string().not_null())
                        .col(ColumnDef::new(Brands::LogoUrl).string().not_null())
                        .col(
                            ColumnDef::new(Brands::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Brands::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_brands_name_key")
                        .table(Brands::Table)
                        .col(Brands::NameKey)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Brands::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Brands {
        Table,
        Id,
        Name,
        NameKey,
        LogoUrl,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_members_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_members_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Members::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Members::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Members::Name).string().not_null())
                        .col(ColumnDef::new(Members::Email).string().not_null())
                        .col(ColumnDef::new(Members::Phone).string().null())
                        .col(
                            ColumnDef::new(Members::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Members::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Members {
        Table,
        Id,
        Name,
        Email,
        Phone,
        CreatedAt,
    }
}

mod m20240301_000003_create_cars_table {
    use super::m20240301_000001_create_brands_table::Brands;
    use super::vehicle;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_cars_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(Cars::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Cars::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(Cars::BrandId).integer().not_null());
            vehicle::columns(&mut table)
                .col(ColumnDef::new(Cars::ShortDescription).string().null())
                .col(ColumnDef::new(Cars::Status).string_len(16).not_null())
                .col(
                    ColumnDef::new(Cars::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(Cars::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_cars_brand_id")
                        .from(Cars::Table, Cars::BrandId)
                        .to(Brands::Table, Brands::Id)
                        .on_delete(ForeignKeyAction::Restrict)
                        .on_update(ForeignKeyAction::Cascade),
                );

            manager.create_table(table.to_owned()).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_cars_brand_id")
                        .table(Cars::Table)
                        .col(Cars::BrandId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Cars::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Cars {
        Table,
        Id,
        BrandId,
        ShortDescription,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_car_images_table {
    use super::m20240301_000003_create_cars_table::Cars;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_car_images_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CarImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CarImages::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CarImages::CarId).integer().not_null())
                        .col(ColumnDef::new(CarImages::Url).text().not_null())
                        .col(
                            ColumnDef::new(CarImages::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(CarImages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_car_images_car_id")
                                .from(CarImages::Table, CarImages::CarId)
                                .to(Cars::Table, Cars::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_car_images_car_id")
                        .table(CarImages::Table)
                        .col(CarImages::CarId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CarImages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CarImages {
        Table,
        Id,
        CarId,
        Url,
        Position,
        CreatedAt,
    }
}

mod m20240301_000005_create_sell_listings_table {
    use super::m20240301_000001_create_brands_table::Brands;
    use super::m20240301_000002_create_members_table::Members;
    use super::m20240301_000003_create_cars_table::Cars;
    use super::vehicle;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_sell_listings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(SellListings::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(SellListings::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(SellListings::SellerName).string().not_null())
                .col(ColumnDef::new(SellListings::SellerEmail).string().not_null())
                .col(ColumnDef::new(SellListings::SellerPhone).string().null())
                .col(ColumnDef::new(SellListings::BrandId).integer().null())
                .col(ColumnDef::new(SellListings::BrandName).string().null());
            vehicle::columns(&mut table)
                .col(ColumnDef::new(SellListings::ImageUrl).text().null())
                .col(
                    ColumnDef::new(SellListings::Status)
                        .string_len(16)
                        .not_null()
                        .default("PENDING"),
                )
                .col(ColumnDef::new(SellListings::RejectionReason).text().null())
                .col(ColumnDef::new(SellListings::CarId).integer().null())
                .col(ColumnDef::new(SellListings::MemberId).integer().null())
                .col(
                    ColumnDef::new(SellListings::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(SellListings::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_sell_listings_brand_id")
                        .from(SellListings::Table, SellListings::BrandId)
                        .to(Brands::Table, Brands::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_sell_listings_car_id")
                        .from(SellListings::Table, SellListings::CarId)
                        .to(Cars::Table, Cars::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_sell_listings_member_id")
                        .from(SellListings::Table, SellListings::MemberId)
                        .to(Members::Table, Members::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                );

            manager.create_table(table.to_owned()).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sell_listings_status")
                        .table(SellListings::Table)
                        .col(SellListings::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SellListings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum SellListings {
        Table,
        Id,
        SellerName,
        SellerEmail,
        SellerPhone,
        BrandId,
        BrandName,
        ImageUrl,
        Status,
        RejectionReason,
        CarId,
        MemberId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000006_create_sell_listing_images_table {
    use super::m20240301_000005_create_sell_listings_table::SellListings;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_sell_listing_images_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SellListingImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SellListingImages::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SellListingImages::SellListingId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SellListingImages::Url).text().not_null())
                        .col(
                            ColumnDef::new(SellListingImages::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SellListingImages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sell_listing_images_sell_listing_id")
                                .from(SellListingImages::Table, SellListingImages::SellListingId)
                                .to(SellListings::Table, SellListings::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sell_listing_images_sell_listing_id")
                        .table(SellListingImages::Table)
                        .col(SellListingImages::SellListingId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SellListingImages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SellListingImages {
        Table,
        Id,
        SellListingId,
        Url,
        Position,
        CreatedAt,
    }
}

mod m20240301_000007_create_sell_listing_originals_table {
    use super::m20240301_000003_create_cars_table::Cars;
    use super::m20240301_000005_create_sell_listings_table::SellListings;
    use super::vehicle;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_sell_listing_originals_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(SellListingOriginals::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(SellListingOriginals::Id)
                        .integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::SellListingId)
                        .integer()
                        .null(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::CarId)
                        .integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::SellerName)
                        .string()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::SellerEmail)
                        .string()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::SellerPhone)
                        .string()
                        .null(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::BrandName)
                        .string()
                        .not_null(),
                );
            vehicle::columns(&mut table)
                .col(ColumnDef::new(SellListingOriginals::ImageUrl).text().null())
                .col(
                    ColumnDef::new(SellListingOriginals::Status)
                        .string_len(16)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(SellListingOriginals::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null(),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_sell_listing_originals_sell_listing_id")
                        .from(
                            SellListingOriginals::Table,
                            SellListingOriginals::SellListingId,
                        )
                        .to(SellListings::Table, SellListings::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_sell_listing_originals_car_id")
                        .from(SellListingOriginals::Table, SellListingOriginals::CarId)
                        .to(Cars::Table, Cars::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                );

            manager.create_table(table.to_owned()).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sell_listing_originals_car_id")
                        .table(SellListingOriginals::Table)
                        .col(SellListingOriginals::CarId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SellListingOriginals::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum SellListingOriginals {
        Table,
        Id,
        SellListingId,
        CarId,
        SellerName,
        SellerEmail,
        SellerPhone,
        BrandName,
        ImageUrl,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

/// Opens a short-lived connection for the migration CLI.
pub async fn connect_for_migrations(db_url: &str) -> Result<DatabaseConnection> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .sqlx_logging(true);

    let db = Database::connect(opt).await.map_err(|e| {
        error!("Migration connection failed: {}", e);
        e
    })?;

    Ok(db)
}
