use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Whether a product's stock is one undivided count or tracked per size variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePolicy {
    #[default]
    Single,
    Multiple,
}

impl SizePolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SizePolicy::Single => "single",
            SizePolicy::Multiple => "multiple",
        }
    }
}

impl std::fmt::Display for SizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(SizePolicy::Single),
            "multiple" => Ok(SizePolicy::Multiple),
            other => Err(CoreError::InvalidSizePolicy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Primary,
    Secondary,
    #[default]
    Other,
}

impl ImageType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Primary => "primary",
            ImageType::Secondary => "secondary",
            ImageType::Other => "other",
        }
    }
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(ImageType::Primary),
            "secondary" => Ok(ImageType::Secondary),
            "other" => Ok(ImageType::Other),
            other => Err(CoreError::InvalidImageType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub is_active: bool,
    pub size_policy: SizePolicy,
    /// Only meaningful under [`SizePolicy::Single`].
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    /// Either an absolute `http(s)` URL or a path relative to the media root.
    pub image_url: String,
    pub alt_text: Option<String>,
    pub image_type: ImageType,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSize {
    pub id: i64,
    pub size_name: String,
    pub size_code: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub size_id: i64,
    pub sku: String,
    /// Added to the product's base price.
    pub price_adjustment: Decimal,
    pub stock_quantity: i32,
    pub reorder_threshold: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductGroup {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// A product's membership in a category, as resolved for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLink {
    pub product_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub display_order: i32,
}

/// Returns `true` if re-parenting `category_id` under `new_parent` would make
/// the category its own ancestor.
///
/// Parent chains that already loop (corrupt data) are treated as cycles.
#[must_use]
pub fn would_create_cycle(categories: &[Category], category_id: i64, new_parent: i64) -> bool {
    let parents: HashMap<i64, Option<i64>> =
        categories.iter().map(|c| (c.id, c.parent_id)).collect();

    let mut current = Some(new_parent);
    let mut steps = 0usize;
    while let Some(id) = current {
        if id == category_id || steps > parents.len() {
            return true;
        }
        current = parents.get(&id).copied().flatten();
        steps += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, parent_id: Option<i64>) -> Category {
        Category {
            id,
            name: format!("cat-{id}"),
            parent_id,
            description: None,
        }
    }

    #[test]
    fn size_policy_round_trips_through_str() {
        assert_eq!("single".parse::<SizePolicy>().unwrap(), SizePolicy::Single);
        assert_eq!(
            "multiple".parse::<SizePolicy>().unwrap(),
            SizePolicy::Multiple
        );
        assert_eq!(SizePolicy::Multiple.to_string(), "multiple");
    }

    #[test]
    fn size_policy_rejects_unknown_value() {
        let err = "several".parse::<SizePolicy>().unwrap_err();
        assert!(err.to_string().contains("several"));
    }

    #[test]
    fn image_type_serializes_lowercase() {
        let json = serde_json::to_string(&ImageType::Secondary).unwrap();
        assert_eq!(json, "\"secondary\"");
        assert_eq!("other".parse::<ImageType>().unwrap(), ImageType::Other);
        assert!("additional".parse::<ImageType>().is_err());
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let cats = vec![category(1, None)];
        assert!(would_create_cycle(&cats, 1, 1));
    }

    #[test]
    fn parenting_under_descendant_is_a_cycle() {
        // 1 <- 2 <- 3
        let cats = vec![category(1, None), category(2, Some(1)), category(3, Some(2))];
        assert!(would_create_cycle(&cats, 1, 3));
    }

    #[test]
    fn parenting_under_sibling_is_fine() {
        let cats = vec![category(1, None), category(2, Some(1)), category(3, Some(1))];
        assert!(!would_create_cycle(&cats, 2, 3));
    }

    #[test]
    fn existing_loop_is_reported_as_cycle() {
        let cats = vec![category(1, Some(2)), category(2, Some(1)), category(3, None)];
        assert!(would_create_cycle(&cats, 3, 1));
    }
}
