//! Database operations for `product_sizes`.

use sqlx::PgPool;
use vitrine_core::ProductSize;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct SizeRow {
    id: i64,
    size_name: String,
    size_code: String,
    display_order: i32,
}

impl From<SizeRow> for ProductSize {
    fn from(row: SizeRow) -> Self {
        ProductSize {
            id: row.id,
            size_name: row.size_name,
            size_code: row.size_code,
            display_order: row.display_order,
        }
    }
}

/// Returns all sizes ordered by display order, then id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_sizes(pool: &PgPool) -> Result<Vec<ProductSize>, DbError> {
    let rows = sqlx::query_as::<_, SizeRow>(
        "SELECT id, size_name, size_code, display_order FROM product_sizes \
         ORDER BY display_order, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProductSize::from).collect())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; a taken `size_code` is a
/// unique violation.
pub async fn create_size(
    pool: &PgPool,
    size_code: &str,
    size_name: &str,
    display_order: i32,
) -> Result<ProductSize, DbError> {
    let row = sqlx::query_as::<_, SizeRow>(
        "INSERT INTO product_sizes (size_code, size_name, display_order) \
         VALUES ($1, $2, $3) \
         RETURNING id, size_name, size_code, display_order",
    )
    .bind(size_code)
    .bind(size_name)
    .bind(display_order)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Returns `false` if no such size existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails; a size still used by a
/// variant is a foreign-key violation.
pub async fn delete_size(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM product_sizes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
