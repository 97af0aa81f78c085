//! Database operations for `product_images`.

use sqlx::PgPool;
use vitrine_core::{ImageType, ProductImage};

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ImageRow {
    id: i64,
    product_id: i64,
    image_url: String,
    alt_text: Option<String>,
    image_type: String,
    display_order: i32,
}

impl TryFrom<ImageRow> for ProductImage {
    type Error = DbError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        Ok(ProductImage {
            id: row.id,
            product_id: row.product_id,
            image_url: row.image_url,
            alt_text: row.alt_text,
            image_type: row.image_type.parse()?,
            display_order: row.display_order,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub product_id: i64,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub image_type: ImageType,
    pub display_order: i32,
}

/// Returns one product's images in display order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_images(pool: &PgPool, product_id: i64) -> Result<Vec<ProductImage>, DbError> {
    list_images_for(pool, &[product_id]).await
}

/// Returns the images of all listed products, ordered by product, display
/// order and id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_images_for(
    pool: &PgPool,
    product_ids: &[i64],
) -> Result<Vec<ProductImage>, DbError> {
    let rows = sqlx::query_as::<_, ImageRow>(
        "SELECT id, product_id, image_url, alt_text, image_type, display_order \
         FROM product_images \
         WHERE product_id = ANY($1) \
         ORDER BY product_id, display_order, id",
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ProductImage::try_from).collect()
}

/// Attaches an image to a product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; an unknown product is a
/// foreign-key violation.
pub async fn add_image(pool: &PgPool, image: &NewImage) -> Result<ProductImage, DbError> {
    let row = sqlx::query_as::<_, ImageRow>(
        "INSERT INTO product_images (product_id, image_url, alt_text, image_type, display_order) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, product_id, image_url, alt_text, image_type, display_order",
    )
    .bind(image.product_id)
    .bind(&image.image_url)
    .bind(&image.alt_text)
    .bind(image.image_type.as_str())
    .bind(image.display_order)
    .fetch_one(pool)
    .await?;

    ProductImage::try_from(row)
}

/// Deletes an image belonging to `product_id`. Returns `false` if there was none.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_image(pool: &PgPool, product_id: i64, image_id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM product_images WHERE id = $1 AND product_id = $2")
        .bind(image_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
