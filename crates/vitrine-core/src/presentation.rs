//! Externally-shaped views of catalog products.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{
    CategoryLink, ImageType, Product, ProductImage, ProductSize, ProductVariant, SizePolicy,
};
use crate::images::{absolute_url, display_image, ordered, secondary_image, Origin};
use crate::stock::{total_stock, unit_price};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentedImage {
    pub image_id: i64,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub image_type: ImageType,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentedProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "secondaryImage")]
    pub secondary_image: Option<String>,
    pub category: Option<String>,
    pub images: Vec<PresentedImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeOption {
    pub size_code: String,
    pub size_name: String,
    pub sku: String,
    pub price: f64,
    pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: PresentedProduct,
    pub stock: i64,
    pub sizes: Vec<SizeOption>,
}

fn to_float(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

impl PresentedProduct {
    /// Shapes `product` for the storefront. Images and category links that
    /// belong to other products are ignored, so callers may pass batch results.
    #[must_use]
    pub fn build(
        product: &Product,
        images: &[ProductImage],
        categories: &[CategoryLink],
        origin: &Origin,
    ) -> Self {
        let own: Vec<ProductImage> = images
            .iter()
            .filter(|img| img.product_id == product.id)
            .cloned()
            .collect();

        let url_of = |img: &ProductImage| absolute_url(&img.image_url, origin);

        let category = categories
            .iter()
            .filter(|link| link.product_id == product.id)
            .min_by_key(|link| (link.display_order, link.category_id))
            .map(|link| link.category_name.clone());

        Self {
            id: product.id,
            name: product.name.clone(),
            price: to_float(product.base_price),
            description: product.description.clone(),
            image: display_image(&own).map(url_of),
            secondary_image: secondary_image(&own).map(url_of),
            category,
            images: ordered(&own)
                .into_iter()
                .map(|img| PresentedImage {
                    image_id: img.id,
                    image_url: url_of(img),
                    alt_text: img.alt_text.clone(),
                    image_type: img.image_type,
                    display_order: img.display_order,
                })
                .collect(),
        }
    }
}

impl ProductDetail {
    /// Detail view: the card plus total stock and the purchasable sizes.
    ///
    /// Inactive variants and variants whose size is unknown are left out.
    #[must_use]
    pub fn build(
        product: &Product,
        images: &[ProductImage],
        categories: &[CategoryLink],
        variants: &[ProductVariant],
        sizes: &[ProductSize],
        origin: &Origin,
    ) -> Self {
        let sizes_by_id: HashMap<i64, &ProductSize> = sizes.iter().map(|s| (s.id, s)).collect();

        let mut options: Vec<(i32, SizeOption)> = variants
            .iter()
            .filter(|v| v.product_id == product.id && v.is_active)
            .filter_map(|v| {
                let size = sizes_by_id.get(&v.size_id)?;
                Some((
                    size.display_order,
                    SizeOption {
                        size_code: size.size_code.clone(),
                        size_name: size.size_name.clone(),
                        sku: v.sku.clone(),
                        price: to_float(unit_price(product, v)),
                        in_stock: v.stock_quantity > 0,
                    },
                ))
            })
            .collect();
        options.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.size_code.cmp(&b.1.size_code)));

        Self {
            product: PresentedProduct::build(product, images, categories, origin),
            stock: total_stock(product, variants),
            sizes: match product.size_policy {
                SizePolicy::Single => Vec::new(),
                SizePolicy::Multiple => options.into_iter().map(|(_, o)| o).collect(),
            },
        }
    }
}
