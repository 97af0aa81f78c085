//! Storage-agnostic catalog reads and the query service built on them.

use std::collections::HashMap;
use std::future::Future;

use crate::catalog::{CategoryLink, Product, ProductImage, ProductSize, ProductVariant};
use crate::filters::ProductFilters;
use crate::images::Origin;
use crate::presentation::{PresentedProduct, ProductDetail};

/// Read capabilities the catalog service needs from a storage backend.
pub trait CatalogRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Any product by id, active or not.
    fn get_product(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send;

    /// Active products passing `filters`, ordered by id ascending.
    fn list_active_products(
        &self,
        filters: &ProductFilters,
    ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send;

    fn get_variants(
        &self,
        product_id: i64,
    ) -> impl Future<Output = Result<Vec<ProductVariant>, Self::Error>> + Send;

    /// Images of all listed products, ordered by product, display order and id.
    fn get_images_for(
        &self,
        product_ids: &[i64],
    ) -> impl Future<Output = Result<Vec<ProductImage>, Self::Error>> + Send;

    fn get_category_links(
        &self,
        product_ids: &[i64],
    ) -> impl Future<Output = Result<Vec<CategoryLink>, Self::Error>> + Send;

    fn list_sizes(&self) -> impl Future<Output = Result<Vec<ProductSize>, Self::Error>> + Send;

    fn get_images(
        &self,
        product_id: i64,
    ) -> impl Future<Output = Result<Vec<ProductImage>, Self::Error>> + Send
    where
        Self: Sync,
    {
        async move { self.get_images_for(&[product_id]).await }
    }
}

fn group_by_product<T, F>(items: Vec<T>, key: F) -> HashMap<i64, Vec<T>>
where
    F: Fn(&T) -> i64,
{
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(key(&item)).or_default().push(item);
    }
    grouped
}

/// Lists active products matching `filters`, shaped for the storefront and
/// ordered by id ascending.
///
/// # Errors
///
/// Propagates the repository's error.
pub async fn list_products<R>(
    repo: &R,
    filters: &ProductFilters,
    origin: &Origin,
) -> Result<Vec<PresentedProduct>, R::Error>
where
    R: CatalogRepository + Sync,
{
    let mut products: Vec<Product> = repo
        .list_active_products(filters)
        .await?
        .into_iter()
        .filter(|p| p.is_active)
        .collect();
    if products.is_empty() {
        return Ok(Vec::new());
    }
    products.sort_by_key(|p| p.id);

    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let images = group_by_product(repo.get_images_for(&ids).await?, |img| img.product_id);
    let links = group_by_product(repo.get_category_links(&ids).await?, |l| l.product_id);

    Ok(products
        .iter()
        .map(|p| {
            PresentedProduct::build(
                p,
                images.get(&p.id).map(Vec::as_slice).unwrap_or_default(),
                links.get(&p.id).map(Vec::as_slice).unwrap_or_default(),
                origin,
            )
        })
        .collect())
}

/// Detail view of an active product; `None` for unknown or inactive ids.
///
/// # Errors
///
/// Propagates the repository's error.
pub async fn get_product_detail<R>(
    repo: &R,
    id: i64,
    origin: &Origin,
) -> Result<Option<ProductDetail>, R::Error>
where
    R: CatalogRepository + Sync,
{
    let Some(product) = repo.get_product(id).await?.filter(|p| p.is_active) else {
        return Ok(None);
    };

    let images = repo.get_images(product.id).await?;
    let links = repo.get_category_links(&[product.id]).await?;
    let variants = repo.get_variants(product.id).await?;
    let sizes = repo.list_sizes().await?;

    Ok(Some(ProductDetail::build(
        &product, &images, &links, &variants, &sizes, origin,
    )))
}
