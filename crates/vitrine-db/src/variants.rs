//! Database operations for `product_variants`.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use vitrine_core::{ProductVariant, SizePolicy};

use crate::DbError;

const VARIANT_COLUMNS: &str = "id, product_id, size_id, sku, price_adjustment, stock_quantity, \
     reorder_threshold, is_active";

#[derive(Debug, Clone, sqlx::FromRow)]
struct VariantRow {
    id: i64,
    product_id: i64,
    size_id: i64,
    sku: String,
    price_adjustment: Decimal,
    stock_quantity: i32,
    reorder_threshold: i32,
    is_active: bool,
}

impl From<VariantRow> for ProductVariant {
    fn from(row: VariantRow) -> Self {
        ProductVariant {
            id: row.id,
            product_id: row.product_id,
            size_id: row.size_id,
            sku: row.sku,
            price_adjustment: row.price_adjustment,
            stock_quantity: row.stock_quantity,
            reorder_threshold: row.reorder_threshold,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewVariant {
    pub product_id: i64,
    pub size_id: i64,
    pub sku: String,
    pub price_adjustment: Decimal,
    pub stock_quantity: i32,
    pub reorder_threshold: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VariantPatch {
    pub price_adjustment: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub reorder_threshold: Option<i32>,
    pub is_active: Option<bool>,
}

/// Returns a product's variants ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_variants(pool: &PgPool, product_id: i64) -> Result<Vec<ProductVariant>, DbError> {
    list_variants_for(pool, &[product_id]).await
}

/// Returns the variants of all listed products, ordered by product then id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_variants_for(
    pool: &PgPool,
    product_ids: &[i64],
) -> Result<Vec<ProductVariant>, DbError> {
    let rows = sqlx::query_as::<_, VariantRow>(&format!(
        "SELECT {VARIANT_COLUMNS} FROM product_variants \
         WHERE product_id = ANY($1) \
         ORDER BY product_id, id"
    ))
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProductVariant::from).collect())
}

/// Inserts a variant.
///
/// The owning product is locked for the duration so a concurrent switch to
/// the single policy cannot leave the new variant behind.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product does not exist,
/// [`DbError::Rejected`] if its size policy is single, or [`DbError::Sqlx`]
/// for constraint failures (duplicate SKU, duplicate size, unknown size).
pub async fn create_variant(
    pool: &PgPool,
    variant: &NewVariant,
) -> Result<ProductVariant, DbError> {
    let mut tx = pool.begin().await?;

    let policy: Option<String> =
        sqlx::query_scalar("SELECT size_policy FROM products WHERE id = $1 FOR SHARE")
            .bind(variant.product_id)
            .fetch_optional(&mut *tx)
            .await?;
    let policy: SizePolicy = policy.ok_or(DbError::NotFound)?.parse()?;
    if policy == SizePolicy::Single {
        return Err(DbError::Rejected(format!(
            "product {} has size policy single; switch it to multiple before adding variants",
            variant.product_id
        )));
    }

    let row = sqlx::query_as::<_, VariantRow>(&format!(
        "INSERT INTO product_variants \
             (product_id, size_id, sku, price_adjustment, stock_quantity, reorder_threshold, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {VARIANT_COLUMNS}"
    ))
    .bind(variant.product_id)
    .bind(variant.size_id)
    .bind(&variant.sku)
    .bind(variant.price_adjustment)
    .bind(variant.stock_quantity)
    .bind(variant.reorder_threshold)
    .bind(variant.is_active)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row.into())
}

/// Applies a sparse update. Returns `None` when the variant does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_variant(
    pool: &PgPool,
    id: i64,
    patch: &VariantPatch,
) -> Result<Option<ProductVariant>, DbError> {
    let row = sqlx::query_as::<_, VariantRow>(&format!(
        "UPDATE product_variants SET \
             price_adjustment  = COALESCE($2, price_adjustment), \
             stock_quantity    = COALESCE($3, stock_quantity), \
             reorder_threshold = COALESCE($4, reorder_threshold), \
             is_active         = COALESCE($5, is_active), \
             updated_at        = NOW() \
         WHERE id = $1 \
         RETURNING {VARIANT_COLUMNS}"
    ))
    .bind(id)
    .bind(patch.price_adjustment)
    .bind(patch.stock_quantity)
    .bind(patch.reorder_threshold)
    .bind(patch.is_active)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ProductVariant::from))
}

/// Returns `false` if no such variant existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_variant(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM product_variants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes every variant of a product on the caller's connection, usually a
/// transaction that also changed its size policy. Returns the rows removed.
pub(crate) async fn delete_product_variants(
    conn: &mut PgConnection,
    product_id: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM product_variants WHERE product_id = $1")
        .bind(product_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}
