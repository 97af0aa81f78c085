//! Catalog list filters: lenient parsing of query parameters and in-memory matching.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::catalog::Product;

/// Query parameters exactly as received. Every field is kept as a string so a
/// malformed price never fails extraction of the whole query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProductQuery {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
}

/// Validated filters, AND-combined. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    /// Case-insensitive exact match against any linked category name.
    pub category: Option<String>,
    /// Inclusive lower bound on `base_price`.
    pub min_price: Option<Decimal>,
    /// Inclusive upper bound on `base_price`.
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
}

impl RawProductQuery {
    /// Builds the query from decoded `key=value` pairs. A repeated key keeps
    /// its last value; unknown keys are skipped.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut query.category,
                "min_price" => &mut query.min_price,
                "max_price" => &mut query.max_price,
                "search" => &mut query.search,
                _ => continue,
            };
            *slot = Some(value);
        }
        query
    }

    /// Converts raw parameters into filters.
    ///
    /// Empty values are treated as absent. Price bounds that do not parse as a
    /// number are dropped and their parameter names returned alongside.
    #[must_use]
    pub fn to_filters(&self) -> (ProductFilters, Vec<&'static str>) {
        let mut ignored = Vec::new();

        let mut price = |name: &'static str, raw: Option<&String>| -> Option<Decimal> {
            let raw = non_empty(raw)?;
            let parsed = parse_price(raw);
            if parsed.is_none() {
                ignored.push(name);
            }
            parsed
        };

        let min_price = price("min_price", self.min_price.as_ref());
        let max_price = price("max_price", self.max_price.as_ref());

        let filters = ProductFilters {
            category: non_empty(self.category.as_ref()).map(ToOwned::to_owned),
            min_price,
            max_price,
            search: non_empty(self.search.as_ref()).map(ToOwned::to_owned),
        };
        (filters, ignored)
    }
}

impl ProductFilters {
    /// Whether an active-or-not product passes every filter. Activity is the
    /// caller's concern.
    #[must_use]
    pub fn matches(&self, product: &Product, category_names: &[&str]) -> bool {
        if let Some(category) = &self.category {
            let wanted = category.to_lowercase();
            if !category_names.iter().any(|c| c.to_lowercase() == wanted) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.base_price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.base_price > max) {
            return false;
        }
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

fn non_empty(raw: Option<&String>) -> Option<&str> {
    raw.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Parses `"15"`, `"15.50"` or `"1.5e1"`; anything else is `None`.
fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::catalog::SizePolicy;

    fn product(name: &str, price: i64) -> Product {
        Product {
            id: 1,
            name: name.to_string(),
            description: None,
            base_price: Decimal::new(price, 0),
            is_active: true,
            size_policy: SizePolicy::Single,
            stock_quantity: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn raw(min: Option<&str>, max: Option<&str>) -> RawProductQuery {
        RawProductQuery {
            min_price: min.map(ToOwned::to_owned),
            max_price: max.map(ToOwned::to_owned),
            ..RawProductQuery::default()
        }
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn repeated_parameter_keeps_last_value() {
        let query = RawProductQuery::from_pairs(pairs(&[
            ("min_price", "abc"),
            ("min_price", "5"),
            ("utm_source", "mail"),
            ("search", "watch"),
        ]));
        assert_eq!(query.min_price.as_deref(), Some("5"));
        assert_eq!(query.search.as_deref(), Some("watch"));

        let (filters, ignored) = query.to_filters();
        assert_eq!(filters.min_price, Some(Decimal::new(5, 0)));
        assert!(ignored.is_empty());
    }

    #[test]
    fn numeric_bounds_parse() {
        let (filters, ignored) = raw(Some("15"), Some("99.95")).to_filters();
        assert_eq!(filters.min_price, Some(Decimal::new(15, 0)));
        assert_eq!(filters.max_price, Some(Decimal::new(9_995, 2)));
        assert!(ignored.is_empty());
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let (filters, _) = raw(Some("1.5e1"), None).to_filters();
        assert_eq!(filters.min_price, Some(Decimal::new(15, 0)));
    }

    #[test]
    fn non_numeric_bounds_are_ignored() {
        let (filters, ignored) = raw(Some("cheap"), Some("NaN")).to_filters();
        assert_eq!(filters.min_price, None);
        assert_eq!(filters.max_price, None);
        assert_eq!(ignored, vec!["min_price", "max_price"]);
    }

    #[test]
    fn empty_values_are_absent() {
        let query = RawProductQuery {
            category: Some(String::new()),
            min_price: Some("  ".to_string()),
            max_price: None,
            search: Some(String::new()),
        };
        let (filters, ignored) = query.to_filters();
        assert_eq!(filters, ProductFilters::default());
        assert!(ignored.is_empty());
    }

    #[test]
    fn bounds_are_inclusive() {
        let p = product("Watch", 20);
        let filters = ProductFilters {
            min_price: Some(Decimal::new(20, 0)),
            max_price: Some(Decimal::new(20, 0)),
            ..ProductFilters::default()
        };
        assert!(filters.matches(&p, &[]));
    }

    #[test]
    fn min_price_excludes_cheaper_products() {
        let filters = ProductFilters {
            min_price: Some(Decimal::new(15, 0)),
            ..ProductFilters::default()
        };
        assert!(!filters.matches(&product("A", 10), &[]));
        assert!(filters.matches(&product("B", 20), &[]));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filters = ProductFilters {
            search: Some("silver".to_string()),
            ..ProductFilters::default()
        };
        assert!(filters.matches(&product("Silver Watch", 10), &[]));
        assert!(!filters.matches(&product("Gold Watch", 10), &[]));
    }

    #[test]
    fn category_is_case_insensitive_exact() {
        let filters = ProductFilters {
            category: Some("WATCHES".to_string()),
            ..ProductFilters::default()
        };
        let p = product("Silver Watch", 10);
        assert!(filters.matches(&p, &["Accessories", "watches"]));
        assert!(!filters.matches(&p, &["smartwatches"]));
        assert!(!filters.matches(&p, &[]));
    }
}
