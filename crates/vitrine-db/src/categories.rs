//! Database operations for `categories` and `product_categories`.

use sqlx::PgPool;
use vitrine_core::catalog::{would_create_cycle, CategoryLink};
use vitrine_core::Category;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    parent_id: Option<i64>,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LinkRow {
    product_id: i64,
    category_id: i64,
    category_name: String,
    display_order: i32,
}

/// Returns all categories ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, parent_id, description FROM categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Category::from).collect())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; a name already taken
/// (case-insensitively) is a unique violation, an unknown parent a
/// foreign-key violation.
pub async fn create_category(
    pool: &PgPool,
    name: &str,
    parent_id: Option<i64>,
    description: Option<&str>,
) -> Result<Category, DbError> {
    let row = sqlx::query_as::<_, CategoryRow>(
        "INSERT INTO categories (name, parent_id, description) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, parent_id, description",
    )
    .bind(name)
    .bind(parent_id)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Moves a category under `parent_id`, or to the root when `None`.
///
/// The tree is read and updated in one transaction holding an exclusive lock
/// on `categories`, so two concurrent moves cannot together form a loop.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown category or parent,
/// [`DbError::Rejected`] if the move would make the category its own
/// ancestor, or [`DbError::Sqlx`] on query failure.
pub async fn set_category_parent(
    pool: &PgPool,
    category_id: i64,
    parent_id: Option<i64>,
) -> Result<Category, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("LOCK TABLE categories IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let tree: Vec<Category> = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, parent_id, description FROM categories",
    )
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .map(Category::from)
    .collect();

    if !tree.iter().any(|c| c.id == category_id) {
        return Err(DbError::NotFound);
    }
    if let Some(parent) = parent_id {
        if !tree.iter().any(|c| c.id == parent) {
            return Err(DbError::NotFound);
        }
        if would_create_cycle(&tree, category_id, parent) {
            return Err(DbError::Rejected(format!(
                "category {category_id} cannot be placed under its own descendant {parent}"
            )));
        }
    }

    let row = sqlx::query_as::<_, CategoryRow>(
        "UPDATE categories SET parent_id = $2 WHERE id = $1 \
         RETURNING id, name, parent_id, description",
    )
    .bind(category_id)
    .bind(parent_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row.into())
}

/// Deletes a category; its children move to the root and its product links
/// are removed. Returns `false` if no such category existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_category(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Links a product to a category.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; an existing link is a
/// unique violation, an unknown product or category a foreign-key violation.
pub async fn link_product_category(
    pool: &PgPool,
    product_id: i64,
    category_id: i64,
    display_order: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO product_categories (product_id, category_id, display_order) \
         VALUES ($1, $2, $3)",
    )
    .bind(product_id)
    .bind(category_id)
    .bind(display_order)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns `false` if the product was not linked to the category.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn unlink_product_category(
    pool: &PgPool,
    product_id: i64,
    category_id: i64,
) -> Result<bool, DbError> {
    let result =
        sqlx::query("DELETE FROM product_categories WHERE product_id = $1 AND category_id = $2")
            .bind(product_id)
            .bind(category_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns the category links of all listed products, ordered by product,
/// link display order and category id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_category_links(
    pool: &PgPool,
    product_ids: &[i64],
) -> Result<Vec<CategoryLink>, DbError> {
    let rows = sqlx::query_as::<_, LinkRow>(
        "SELECT pc.product_id, pc.category_id, c.name AS category_name, pc.display_order \
         FROM product_categories pc \
         JOIN categories c ON c.id = pc.category_id \
         WHERE pc.product_id = ANY($1) \
         ORDER BY pc.product_id, pc.display_order, pc.category_id",
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| CategoryLink {
            product_id: row.product_id,
            category_id: row.category_id,
            category_name: row.category_name,
            display_order: row.display_order,
        })
        .collect())
}
