use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use vitrine_core::catalog_file::ProductSeed;
use vitrine_core::{CatalogFile, SizePolicy};

use crate::variants::delete_product_variants;
use crate::DbError;

/// Row counts written by [`seed_catalog`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub sizes: usize,
    pub categories: usize,
    pub products: usize,
    pub variants: usize,
    pub images: usize,
    pub groups: usize,
    /// Variants removed because their product is now seeded as single-size.
    pub deleted_variants: u64,
}

/// Upsert a validated catalog file into the database.
///
/// Sizes match on `size_code`, categories and groups on name, products on
/// exact name, variants on SKU. A seeded product's images and category links
/// are replaced by the file's. Existing variants of a product seeded as
/// single-size are deleted and reported in [`SeedSummary::deleted_variants`]
/// with a `warn` log. All writes run inside a single transaction; if any
/// operation fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(pool: &PgPool, catalog: &CatalogFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    let mut size_ids: HashMap<&str, i64> = HashMap::new();
    for size in &catalog.sizes {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO product_sizes (size_code, size_name, display_order) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (size_code) DO UPDATE SET \
                 size_name = EXCLUDED.size_name, \
                 display_order = EXCLUDED.display_order \
             RETURNING id",
        )
        .bind(&size.code)
        .bind(&size.name)
        .bind(size.display_order)
        .fetch_one(&mut *tx)
        .await?;
        size_ids.insert(size.code.as_str(), id);
        summary.sizes += 1;
    }

    // Parents are attached in a second pass so file order does not matter.
    let mut category_ids: HashMap<String, i64> = HashMap::new();
    for category in &catalog.categories {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (name, description) VALUES ($1, $2) \
             ON CONFLICT ((LOWER(name))) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 description = EXCLUDED.description \
             RETURNING id",
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&mut *tx)
        .await?;
        category_ids.insert(category.name.to_lowercase(), id);
        summary.categories += 1;
    }
    for category in &catalog.categories {
        let parent_id = category
            .parent
            .as_ref()
            .and_then(|p| category_ids.get(&p.to_lowercase()).copied());
        sqlx::query("UPDATE categories SET parent_id = $2 WHERE LOWER(name) = LOWER($1)")
            .bind(&category.name)
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;
    }

    let mut product_ids: HashMap<&str, i64> = HashMap::new();
    for product in &catalog.products {
        let product_id = upsert_seed_product(&mut tx, product).await?;
        product_ids.insert(product.name.as_str(), product_id);
        summary.products += 1;

        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        for (order, name) in (0_i32..).zip(&product.categories) {
            let Some(&category_id) = category_ids.get(&name.to_lowercase()) else {
                continue;
            };
            sqlx::query(
                "INSERT INTO product_categories (product_id, category_id, display_order) \
                 VALUES ($1, $2, $3)",
            )
            .bind(product_id)
            .bind(category_id)
            .bind(order)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        for image in &product.images {
            sqlx::query(
                "INSERT INTO product_images \
                     (product_id, image_url, alt_text, image_type, display_order) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(product_id)
            .bind(&image.url)
            .bind(&image.alt_text)
            .bind(image.image_type.as_str())
            .bind(image.display_order)
            .execute(&mut *tx)
            .await?;
            summary.images += 1;
        }

        if product.size_policy == SizePolicy::Single {
            let deleted = delete_product_variants(&mut tx, product_id).await?;
            if deleted > 0 {
                tracing::warn!(
                    product_id,
                    product = %product.name,
                    deleted_variants = deleted,
                    "seeded product is single-size; variants deleted"
                );
            }
            summary.deleted_variants += deleted;
        }
        for variant in &product.variants {
            let Some(&size_id) = size_ids.get(variant.size.as_str()) else {
                continue;
            };
            sqlx::query(
                "INSERT INTO product_variants \
                     (product_id, size_id, sku, price_adjustment, stock_quantity, \
                      reorder_threshold, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (sku) DO UPDATE SET \
                     product_id = EXCLUDED.product_id, \
                     size_id = EXCLUDED.size_id, \
                     price_adjustment = EXCLUDED.price_adjustment, \
                     stock_quantity = EXCLUDED.stock_quantity, \
                     reorder_threshold = EXCLUDED.reorder_threshold, \
                     is_active = EXCLUDED.is_active, \
                     updated_at = NOW()",
            )
            .bind(product_id)
            .bind(size_id)
            .bind(&variant.sku)
            .bind(variant.price_adjustment)
            .bind(variant.stock_quantity)
            .bind(variant.reorder_threshold)
            .bind(variant.is_active)
            .execute(&mut *tx)
            .await?;
            summary.variants += 1;
        }
    }

    for group in &catalog.groups {
        let group_id: i64 = sqlx::query_scalar(
            "INSERT INTO product_groups (name, description) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description \
             RETURNING id",
        )
        .bind(&group.name)
        .bind(&group.description)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM product_group_members WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        for (order, name) in (0_i32..).zip(&group.products) {
            let Some(&product_id) = product_ids.get(name.as_str()) else {
                continue;
            };
            sqlx::query(
                "INSERT INTO product_group_members (group_id, product_id, display_order) \
                 VALUES ($1, $2, $3)",
            )
            .bind(group_id)
            .bind(product_id)
            .bind(order)
            .execute(&mut *tx)
            .await?;
        }
        summary.groups += 1;
    }

    tx.commit().await?;
    Ok(summary)
}

async fn upsert_seed_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &ProductSeed,
) -> Result<i64, DbError> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM products WHERE name = $1 ORDER BY id LIMIT 1")
            .bind(&product.name)
            .fetch_optional(&mut **tx)
            .await?;

    let id: i64 = match existing {
        Some(id) => {
            sqlx::query_scalar(
                "UPDATE products SET \
                     description = $2, base_price = $3, is_active = $4, \
                     size_policy = $5, stock_quantity = $6, updated_at = NOW() \
                 WHERE id = $1 RETURNING id",
            )
            .bind(id)
            .bind(&product.description)
            .bind(product.base_price)
            .bind(product.is_active)
            .bind(product.size_policy.as_str())
            .bind(product.stock_quantity)
            .fetch_one(&mut **tx)
            .await?
        }
        None => {
            sqlx::query_scalar(
                "INSERT INTO products \
                     (name, description, base_price, is_active, size_policy, stock_quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.base_price)
            .bind(product.is_active)
            .bind(product.size_policy.as_str())
            .bind(product.stock_quantity)
            .fetch_one(&mut **tx)
            .await?
        }
    };

    Ok(id)
}
