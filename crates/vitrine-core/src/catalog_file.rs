use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{ImageType, SizePolicy};
use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeSeed {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    /// Name of another category in the same file.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSeed {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub image_type: ImageType,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSeed {
    pub sku: String,
    /// A `code` from the file's `sizes`.
    pub size: String,
    #[serde(default, with = "rust_decimal::serde::str")]
    pub price_adjustment: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub reorder_threshold: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(default)]
    pub size_policy: SizePolicy,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Category names, in display order.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub images: Vec<ImageSeed>,
    #[serde(default)]
    pub variants: Vec<VariantSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSeed {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Product names, in display order.
    #[serde(default)]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub sizes: Vec<SizeSeed>,
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
    #[serde(default)]
    pub groups: Vec<GroupSeed>,
}

fn default_true() -> bool {
    true
}

/// Load and validate a catalog seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CatalogFileParse)?;

    validate_catalog(&catalog)?;

    Ok(catalog)
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Validation(message)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut size_codes = HashSet::new();
    for size in &catalog.sizes {
        if size.code.trim().is_empty() || size.name.trim().is_empty() {
            return Err(invalid("size code and name must be non-empty".to_string()));
        }
        if !size_codes.insert(size.code.as_str()) {
            return Err(invalid(format!("duplicate size code: '{}'", size.code)));
        }
    }

    let mut category_names = HashSet::new();
    for category in &catalog.categories {
        if category.name.trim().is_empty() {
            return Err(invalid("category name must be non-empty".to_string()));
        }
        if !category_names.insert(category.name.to_lowercase()) {
            return Err(invalid(format!(
                "duplicate category name: '{}'",
                category.name
            )));
        }
    }
    for category in &catalog.categories {
        if let Some(parent) = &category.parent {
            if parent.eq_ignore_ascii_case(&category.name) {
                return Err(invalid(format!(
                    "category '{}' cannot be its own parent",
                    category.name
                )));
            }
            if !category_names.contains(&parent.to_lowercase()) {
                return Err(invalid(format!(
                    "category '{}' references unknown parent '{parent}'",
                    category.name
                )));
            }
        }
    }
    if let Some(looping) = find_parent_cycle(&catalog.categories) {
        return Err(invalid(format!(
            "category '{looping}' is its own ancestor through its parent chain"
        )));
    }

    let mut product_names = HashSet::new();
    let mut skus = HashSet::new();
    for product in &catalog.products {
        validate_product(product, &size_codes, &category_names, &mut skus)?;
        product_names.insert(product.name.as_str());
    }

    let mut group_names = HashSet::new();
    for group in &catalog.groups {
        if group.name.trim().is_empty() {
            return Err(invalid("group name must be non-empty".to_string()));
        }
        if !group_names.insert(group.name.to_lowercase()) {
            return Err(invalid(format!("duplicate group name: '{}'", group.name)));
        }
        if let Some(missing) = group
            .products
            .iter()
            .find(|name| !product_names.contains(name.as_str()))
        {
            return Err(invalid(format!(
                "group '{}' references unknown product '{missing}'",
                group.name
            )));
        }
    }

    Ok(())
}

/// Returns the name of a category whose parent chain leads back to itself.
/// Parents must already be known to resolve to categories in the file.
fn find_parent_cycle(categories: &[CategorySeed]) -> Option<&str> {
    let parents: HashMap<String, String> = categories
        .iter()
        .filter_map(|c| Some((c.name.to_lowercase(), c.parent.as_ref()?.to_lowercase())))
        .collect();

    categories.iter().find_map(|category| {
        let start = category.name.to_lowercase();
        let mut seen = HashSet::new();
        let mut current = parents.get(&start);
        while let Some(name) = current {
            if *name == start {
                return Some(category.name.as_str());
            }
            if !seen.insert(name) {
                // Loops further up; reported when the walk starts inside it.
                return None;
            }
            current = parents.get(name);
        }
        None
    })
}

fn validate_product<'a>(
    product: &'a ProductSeed,
    size_codes: &HashSet<&str>,
    category_names: &HashSet<String>,
    skus: &mut HashSet<&'a str>,
) -> Result<(), ConfigError> {
    if product.name.trim().is_empty() {
        return Err(invalid("product name must be non-empty".to_string()));
    }
    if product.base_price.is_sign_negative() {
        return Err(invalid(format!(
            "product '{}' has negative base_price {}",
            product.name, product.base_price
        )));
    }
    if product.stock_quantity < 0 {
        return Err(invalid(format!(
            "product '{}' has negative stock_quantity",
            product.name
        )));
    }
    if let Some(unknown) = product
        .categories
        .iter()
        .find(|c| !category_names.contains(&c.to_lowercase()))
    {
        return Err(invalid(format!(
            "product '{}' references unknown category '{unknown}'",
            product.name
        )));
    }
    if product.images.iter().any(|img| img.url.trim().is_empty()) {
        return Err(invalid(format!(
            "product '{}' has an image without a url",
            product.name
        )));
    }

    if product.size_policy == SizePolicy::Single && !product.variants.is_empty() {
        return Err(invalid(format!(
            "product '{}' has size_policy single but declares variants",
            product.name
        )));
    }

    let mut sizes_used = HashSet::new();
    for variant in &product.variants {
        if variant.sku.trim().is_empty() {
            return Err(invalid(format!(
                "product '{}' has a variant without a sku",
                product.name
            )));
        }
        if !skus.insert(variant.sku.as_str()) {
            return Err(invalid(format!("duplicate sku: '{}'", variant.sku)));
        }
        if !size_codes.contains(variant.size.as_str()) {
            return Err(invalid(format!(
                "variant '{}' references unknown size '{}'",
                variant.sku, variant.size
            )));
        }
        if !sizes_used.insert(variant.size.as_str()) {
            return Err(invalid(format!(
                "product '{}' has two variants for size '{}'",
                product.name, variant.size
            )));
        }
        if variant.stock_quantity < 0 || variant.reorder_threshold < 0 {
            return Err(invalid(format!(
                "variant '{}' has negative stock or reorder threshold",
                variant.sku
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_file_test.rs"]
mod tests;
