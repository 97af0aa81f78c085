//! Postgres-backed [`CatalogRepository`].

use sqlx::PgPool;
use vitrine_core::catalog::CategoryLink;
use vitrine_core::{
    CatalogRepository, Product, ProductFilters, ProductImage, ProductSize, ProductVariant,
};

use crate::DbError;

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for PgCatalog {
    type Error = DbError;

    async fn get_product(&self, id: i64) -> Result<Option<Product>, DbError> {
        crate::products::get_product(&self.pool, id).await
    }

    async fn list_active_products(
        &self,
        filters: &ProductFilters,
    ) -> Result<Vec<Product>, DbError> {
        crate::products::list_active_products(&self.pool, filters).await
    }

    async fn get_variants(&self, product_id: i64) -> Result<Vec<ProductVariant>, DbError> {
        crate::variants::list_variants(&self.pool, product_id).await
    }

    async fn get_images_for(&self, product_ids: &[i64]) -> Result<Vec<ProductImage>, DbError> {
        crate::images::list_images_for(&self.pool, product_ids).await
    }

    async fn get_category_links(&self, product_ids: &[i64]) -> Result<Vec<CategoryLink>, DbError> {
        crate::categories::list_category_links(&self.pool, product_ids).await
    }

    async fn list_sizes(&self) -> Result<Vec<ProductSize>, DbError> {
        crate::sizes::list_sizes(&self.pool).await
    }
}
