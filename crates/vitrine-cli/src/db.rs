//! Database maintenance commands.

use std::path::PathBuf;

use clap::Subcommand;
use sqlx::PgPool;
use vitrine_core::AppConfig;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Load the catalog seed file (sizes, categories, products, groups)
    Seed {
        /// Seed file to load instead of `VITRINE_CATALOG_PATH`
        #[arg(long)]
        file: Option<PathBuf>,
        /// Validate the file and print what it contains without writing
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn run(
    pool: &PgPool,
    config: &AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            vitrine_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = vitrine_db::run_migrations(pool).await?;
            println!("migrations up to date ({applied} known)");
        }
        DbCommands::Seed { file, dry_run } => {
            let path = file.unwrap_or_else(|| config.catalog_path.clone());
            let catalog = vitrine_core::load_catalog(&path)?;
            tracing::info!(path = %path.display(), "catalog file validated");

            if dry_run {
                println!(
                    "{}: {} sizes, {} categories, {} products, {} groups (dry run, nothing written)",
                    path.display(),
                    catalog.sizes.len(),
                    catalog.categories.len(),
                    catalog.products.len(),
                    catalog.groups.len(),
                );
                return Ok(());
            }

            vitrine_db::run_migrations(pool).await?;
            let summary = vitrine_db::seed_catalog(pool, &catalog).await?;
            println!(
                "seeded {} sizes, {} categories, {} products, {} variants, {} images, {} groups",
                summary.sizes,
                summary.categories,
                summary.products,
                summary.variants,
                summary.images,
                summary.groups,
            );
            if summary.deleted_variants > 0 {
                println!(
                    "deleted {} variants of products now seeded as single-size",
                    summary.deleted_variants
                );
            }
        }
    }
    Ok(())
}
