//! A [`CatalogRepository`] over plain vectors, for tests and fixtures.

use std::convert::Infallible;

use crate::catalog::{
    Category, CategoryLink, Product, ProductImage, ProductSize, ProductVariant,
};
use crate::filters::ProductFilters;
use crate::repository::CatalogRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    pub products: Vec<Product>,
    pub images: Vec<ProductImage>,
    pub variants: Vec<ProductVariant>,
    pub sizes: Vec<ProductSize>,
    pub categories: Vec<Category>,
    /// `(product_id, category_id, display_order)`
    pub category_links: Vec<(i64, i64, i32)>,
}

impl InMemoryCatalog {
    fn links_for(&self, product_ids: &[i64]) -> Vec<CategoryLink> {
        let mut links: Vec<CategoryLink> = self
            .category_links
            .iter()
            .filter(|(product_id, _, _)| product_ids.contains(product_id))
            .filter_map(|&(product_id, category_id, display_order)| {
                let category = self.categories.iter().find(|c| c.id == category_id)?;
                Some(CategoryLink {
                    product_id,
                    category_id,
                    category_name: category.name.clone(),
                    display_order,
                })
            })
            .collect();
        links.sort_by_key(|l| (l.product_id, l.display_order, l.category_id));
        links
    }
}

impl CatalogRepository for InMemoryCatalog {
    type Error = Infallible;

    async fn get_product(&self, id: i64) -> Result<Option<Product>, Self::Error> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_active_products(
        &self,
        filters: &ProductFilters,
    ) -> Result<Vec<Product>, Self::Error> {
        let mut matching: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.is_active)
            .filter(|p| {
                let links = self.links_for(&[p.id]);
                let names: Vec<&str> = links.iter().map(|l| l.category_name.as_str()).collect();
                filters.matches(p, &names)
            })
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.id);
        Ok(matching)
    }

    async fn get_variants(&self, product_id: i64) -> Result<Vec<ProductVariant>, Self::Error> {
        let mut variants: Vec<ProductVariant> = self
            .variants
            .iter()
            .filter(|v| v.product_id == product_id)
            .cloned()
            .collect();
        variants.sort_by_key(|v| v.id);
        Ok(variants)
    }

    async fn get_images_for(&self, product_ids: &[i64]) -> Result<Vec<ProductImage>, Self::Error> {
        let mut images: Vec<ProductImage> = self
            .images
            .iter()
            .filter(|img| product_ids.contains(&img.product_id))
            .cloned()
            .collect();
        images.sort_by_key(|img| (img.product_id, img.display_order, img.id));
        Ok(images)
    }

    async fn get_category_links(
        &self,
        product_ids: &[i64],
    ) -> Result<Vec<CategoryLink>, Self::Error> {
        Ok(self.links_for(product_ids))
    }

    async fn list_sizes(&self) -> Result<Vec<ProductSize>, Self::Error> {
        let mut sizes = self.sizes.clone();
        sizes.sort_by_key(|s| (s.display_order, s.id));
        Ok(sizes)
    }
}
