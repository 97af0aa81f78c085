//! Database operations for `products`, including the size-policy switch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use vitrine_core::{Product, ProductFilters, SizePolicy};

use crate::DbError;

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.base_price, p.is_active, \
     p.size_policy, p.stock_quantity, p.created_at, p.updated_at";

/// A row from the `products` table; `size_policy` is still the stored text.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub is_active: bool,
    pub size_policy: String,
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            base_price: row.base_price,
            is_active: row.is_active,
            size_policy: row.size_policy.parse()?,
            stock_quantity: row.stock_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, DbError> {
    rows.into_iter().map(Product::try_from).collect()
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub is_active: bool,
    pub size_policy: SizePolicy,
    pub stock_quantity: i32,
}

/// Sparse update; `None` leaves the column unchanged. The size policy is
/// changed only through [`set_size_policy`].
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub stock_quantity: Option<i32>,
}

/// Returns a product by id regardless of its active flag.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure, or [`DbError::Corrupt`] if the
/// stored size policy is unknown.
pub async fn get_product(pool: &PgPool, id: i64) -> Result<Option<Product>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Product::try_from).transpose()
}

/// Returns every product, active or not, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_all_products(pool: &PgPool) -> Result<Vec<Product>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p ORDER BY p.id"
    ))
    .fetch_all(pool)
    .await?;

    into_products(rows)
}

/// Returns active products passing `filters`, ordered by id.
///
/// Absent filters bind as `NULL` and drop out of the `WHERE` clause.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_active_products(
    pool: &PgPool,
    filters: &ProductFilters,
) -> Result<Vec<Product>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p \
         WHERE p.is_active \
           AND ($1::TEXT IS NULL OR EXISTS ( \
                SELECT 1 FROM product_categories pc \
                JOIN categories c ON c.id = pc.category_id \
                WHERE pc.product_id = p.id AND LOWER(c.name) = LOWER($1))) \
           AND ($2::NUMERIC IS NULL OR p.base_price >= $2) \
           AND ($3::NUMERIC IS NULL OR p.base_price <= $3) \
           AND ($4::TEXT IS NULL OR POSITION(LOWER($4) IN LOWER(p.name)) > 0) \
         ORDER BY p.id"
    ))
    .bind(filters.category.as_deref())
    .bind(filters.min_price)
    .bind(filters.max_price)
    .bind(filters.search.as_deref())
    .fetch_all(pool)
    .await?;

    into_products(rows)
}

/// Inserts a product and returns it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (e.g. a check constraint).
pub async fn create_product(pool: &PgPool, product: &NewProduct) -> Result<Product, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "INSERT INTO products AS p \
             (name, description, base_price, is_active, size_policy, stock_quantity) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING p.id, p.name, p.description, p.base_price, p.is_active, \
                   p.size_policy, p.stock_quantity, p.created_at, p.updated_at",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.base_price)
    .bind(product.is_active)
    .bind(product.size_policy.as_str())
    .bind(product.stock_quantity)
    .fetch_one(pool)
    .await?;

    Product::try_from(row)
}

/// Applies a sparse update. Returns `None` when the product does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_product(
    pool: &PgPool,
    id: i64,
    patch: &ProductPatch,
) -> Result<Option<Product>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "UPDATE products AS p SET \
             name           = COALESCE($2, p.name), \
             description    = COALESCE($3, p.description), \
             base_price     = COALESCE($4, p.base_price), \
             is_active      = COALESCE($5, p.is_active), \
             stock_quantity = COALESCE($6, p.stock_quantity), \
             updated_at     = NOW() \
         WHERE p.id = $1 \
         RETURNING p.id, p.name, p.description, p.base_price, p.is_active, \
                   p.size_policy, p.stock_quantity, p.created_at, p.updated_at",
    )
    .bind(id)
    .bind(&patch.name)
    .bind(&patch.description)
    .bind(patch.base_price)
    .bind(patch.is_active)
    .bind(patch.stock_quantity)
    .fetch_optional(pool)
    .await?;

    row.map(Product::try_from).transpose()
}

/// Deletes a product; images, variants and links cascade.
///
/// Returns `false` if no such product existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_product(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Changes a product's size policy.
///
/// Runs in one transaction with the product row locked. Switching to
/// [`SizePolicy::Single`] deletes every variant of the product; the number of
/// deleted variants is returned (always `0` for [`SizePolicy::Multiple`]).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product does not exist, or
/// [`DbError::Sqlx`] if any statement fails (the transaction is rolled back).
pub async fn set_size_policy(
    pool: &PgPool,
    product_id: i64,
    policy: SizePolicy,
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;

    let previous: Option<String> =
        sqlx::query_scalar("SELECT size_policy FROM products WHERE id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(previous) = previous else {
        return Err(DbError::NotFound);
    };

    sqlx::query("UPDATE products SET size_policy = $2, updated_at = NOW() WHERE id = $1")
        .bind(product_id)
        .bind(policy.as_str())
        .execute(&mut *tx)
        .await?;

    let deleted = match policy {
        SizePolicy::Single => {
            crate::variants::delete_product_variants(&mut tx, product_id).await?
        }
        SizePolicy::Multiple => 0,
    };

    tx.commit().await?;

    if deleted > 0 {
        tracing::warn!(
            product_id,
            previous_policy = %previous,
            deleted_variants = deleted,
            "size policy switched to single; variants deleted"
        );
    } else {
        tracing::debug!(product_id, policy = %policy, "size policy updated");
    }

    Ok(deleted)
}
