use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

// Path relative to crates/vitrine-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &vitrine_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,
    /// A write refused by a catalog rule rather than by the database.
    #[error("{0}")]
    Rejected(String),
    /// A stored value the domain types cannot represent.
    #[error("corrupt row: {0}")]
    Corrupt(#[from] vitrine_core::CoreError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    fn has_code(&self, code: &str) -> bool {
        match self {
            DbError::Sqlx(sqlx::Error::Database(db_err)) => db_err.code().as_deref() == Some(code),
            _ => false,
        }
    }

    /// A unique constraint or unique index rejected the write.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        self.has_code(UNIQUE_VIOLATION)
    }

    /// A foreign key rejected the write (missing parent, or a restricted delete).
    #[must_use]
    pub fn is_foreign_key_violation(&self) -> bool {
        self.has_code(FOREIGN_KEY_VIOLATION)
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // The _sqlx_migrations table does not exist on a fresh database.
    let applied_before: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    MIGRATOR.run(pool).await?;

    let applied_after: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Run a full health check: ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_has_sane_defaults() {
        let config = PoolConfig::default();

        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, DEFAULT_MIN_CONNECTIONS);
        assert_eq!(config.acquire_timeout_secs, DEFAULT_ACQUIRE_TIMEOUT_SECS);
    }

    #[test]
    fn non_database_errors_are_not_constraint_violations() {
        let err = DbError::NotFound;
        assert!(!err.is_unique_violation());
        assert!(!err.is_foreign_key_violation());
        let err = DbError::Sqlx(sqlx::Error::RowNotFound);
        assert!(!err.is_unique_violation());
    }
}

pub mod catalog;
pub mod categories;
pub mod groups;
pub mod images;
pub mod products;
pub mod seed;
pub mod sizes;
pub mod users;
pub mod variants;

pub use catalog::PgCatalog;
pub use categories::{
    create_category, delete_category, link_product_category, list_categories,
    list_category_links, set_category_parent, unlink_product_category,
};
pub use groups::{
    add_group_member, create_group, delete_group, list_group_members, list_groups,
    remove_group_member, GroupMemberRow,
};
pub use images::{add_image, delete_image, list_images, list_images_for, NewImage};
pub use products::{
    create_product, delete_product, get_product, list_active_products, list_all_products,
    set_size_policy, update_product, NewProduct, ProductPatch, ProductRow,
};
pub use seed::{seed_catalog, SeedSummary};
pub use sizes::{create_size, delete_size, list_sizes};
pub use users::{
    create_user, find_login_candidates, get_user, record_login, NewUser, UserRow,
};
pub use variants::{
    create_variant, delete_variant, list_variants, list_variants_for, update_variant, NewVariant,
    VariantPatch,
};
