//! Database operations for `product_groups` and `product_group_members`.

use sqlx::PgPool;
use vitrine_core::ProductGroup;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    description: Option<String>,
    is_active: bool,
}

impl From<GroupRow> for ProductGroup {
    fn from(row: GroupRow) -> Self {
        ProductGroup {
            id: row.id,
            name: row.name,
            description: row.description,
            is_active: row.is_active,
        }
    }
}

/// A product's place in a group.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GroupMemberRow {
    pub group_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub display_order: i32,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_groups(pool: &PgPool) -> Result<Vec<ProductGroup>, DbError> {
    let rows = sqlx::query_as::<_, GroupRow>(
        "SELECT id, name, description, is_active FROM product_groups ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProductGroup::from).collect())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; a taken name is a unique
/// violation.
pub async fn create_group(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    is_active: bool,
) -> Result<ProductGroup, DbError> {
    let row = sqlx::query_as::<_, GroupRow>(
        "INSERT INTO product_groups (name, description, is_active) \
         VALUES ($1, $2, $3) \
         RETURNING id, name, description, is_active",
    )
    .bind(name)
    .bind(description)
    .bind(is_active)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Returns `false` if no such group existed. Memberships cascade.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_group(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM product_groups WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Members of a group in display order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on query failure.
pub async fn list_group_members(
    pool: &PgPool,
    group_id: i64,
) -> Result<Vec<GroupMemberRow>, DbError> {
    let rows = sqlx::query_as::<_, GroupMemberRow>(
        "SELECT m.group_id, m.product_id, p.name AS product_name, m.display_order \
         FROM product_group_members m \
         JOIN products p ON p.id = m.product_id \
         WHERE m.group_id = $1 \
         ORDER BY m.display_order, m.product_id",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails; an existing membership is
/// a unique violation, an unknown group or product a foreign-key violation.
pub async fn add_group_member(
    pool: &PgPool,
    group_id: i64,
    product_id: i64,
    display_order: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO product_group_members (group_id, product_id, display_order) \
         VALUES ($1, $2, $3)",
    )
    .bind(group_id)
    .bind(product_id)
    .bind(display_order)
    .execute(pool)
    .await?;
    Ok(())
}

/// Returns `false` if the product was not a member.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn remove_group_member(
    pool: &PgPool,
    group_id: i64,
    product_id: i64,
) -> Result<bool, DbError> {
    let result =
        sqlx::query("DELETE FROM product_group_members WHERE group_id = $1 AND product_id = $2")
            .bind(group_id)
            .bind(product_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}
