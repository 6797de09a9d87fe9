use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use dealership_api::{
    config,
    migrator::{connect_for_migrations, Migrator},
};

#[derive(Parser)]
#[command(name = "migration", about = "Manage the dealership database schema", version)]
struct Cli {
    /// Overrides the database URL from the application configuration
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        #[arg(long, help = "Number of migrations to apply (default: all)")]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1, help = "Number of migrations to roll back")]
        steps: u32,
    },
    /// List applied and pending migrations
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let database_url = match cli.database_url {
        Some(url) => {
            config::init_tracing("info", false);
            url
        }
        None => {
            let cfg = config::load_config().context("failed to load configuration")?;
            config::init_tracing(cfg.log_level(), cfg.log_json);
            cfg.database_url
        }
    };

    let db = connect_for_migrations(&database_url).await?;

    match cli.command {
        Commands::Up { steps } => {
            Migrator::up(&db, steps).await?;
            info!("Migrations applied");
        }
        Commands::Down { steps } => {
            Migrator::down(&db, Some(steps)).await?;
            info!(steps, "Migrations rolled back");
        }
        Commands::Status => {
            for migration in Migrator::get_applied_migrations(&db).await? {
                println!("applied  {}", migration.name());
            }
            for migration in Migrator::get_pending_migrations(&db).await? {
                println!("pending  {}", migration.name());
            }
        }
        Commands::Fresh => {
            Migrator::fresh(&db).await?;
            info!("Schema recreated");
        }
    }

    Ok(())
}
