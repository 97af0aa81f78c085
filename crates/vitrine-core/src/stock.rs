//! Stock aggregation across a product's size variants.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::{Product, ProductVariant, SizePolicy};

/// Sellable stock for a product.
///
/// Under [`SizePolicy::Single`] this is the product's own count and any stray
/// variants are ignored. Under [`SizePolicy::Multiple`] it is the sum over the
/// product's active variants, `0` when there are none.
#[must_use]
pub fn total_stock(product: &Product, variants: &[ProductVariant]) -> i64 {
    match product.size_policy {
        SizePolicy::Single => i64::from(product.stock_quantity),
        SizePolicy::Multiple => variants
            .iter()
            .filter(|v| v.product_id == product.id && v.is_active)
            .map(|v| i64::from(v.stock_quantity))
            .sum(),
    }
}

/// Price of one unit of `variant`: base price plus the variant's adjustment.
#[must_use]
pub fn unit_price(product: &Product, variant: &ProductVariant) -> Decimal {
    product.base_price + variant.price_adjustment
}

/// An active variant at or below its reorder threshold.
#[must_use]
pub fn needs_reorder(variant: &ProductVariant) -> bool {
    variant.is_active && variant.stock_quantity <= variant.reorder_threshold
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSummary {
    pub product_id: i64,
    pub size_policy: SizePolicy,
    pub total_stock: i64,
    pub active_variants: usize,
    /// SKUs of active variants at or below their reorder threshold.
    pub reorder_skus: Vec<String>,
}

impl StockSummary {
    #[must_use]
    pub fn compute(product: &Product, variants: &[ProductVariant]) -> Self {
        let own: Vec<&ProductVariant> = match product.size_policy {
            SizePolicy::Single => Vec::new(),
            SizePolicy::Multiple => variants
                .iter()
                .filter(|v| v.product_id == product.id)
                .collect(),
        };

        Self {
            product_id: product.id,
            size_policy: product.size_policy,
            total_stock: total_stock(product, variants),
            active_variants: own.iter().filter(|v| v.is_active).count(),
            reorder_skus: own
                .iter()
                .filter(|v| needs_reorder(v))
                .map(|v| v.sku.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn product(size_policy: SizePolicy, stock_quantity: i32) -> Product {
        Product {
            id: 7,
            name: "Silver Watch".to_string(),
            description: None,
            base_price: Decimal::new(19_900, 2),
            is_active: true,
            size_policy,
            stock_quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn variant(id: i64, stock_quantity: i32, is_active: bool) -> ProductVariant {
        ProductVariant {
            id,
            product_id: 7,
            size_id: id,
            sku: format!("SKU-{id}"),
            price_adjustment: Decimal::ZERO,
            stock_quantity,
            reorder_threshold: 2,
            is_active,
        }
    }

    #[test]
    fn multiple_sums_only_active_variants() {
        let p = product(SizePolicy::Multiple, 999);
        let vs = vec![variant(1, 4, true), variant(2, 6, true), variant(3, 100, false)];
        assert_eq!(total_stock(&p, &vs), 10);
    }

    #[test]
    fn multiple_without_variants_is_zero() {
        let p = product(SizePolicy::Multiple, 50);
        assert_eq!(total_stock(&p, &[]), 0);
    }

    #[test]
    fn single_ignores_stray_variants() {
        let p = product(SizePolicy::Single, 12);
        let vs = vec![variant(1, 40, true)];
        assert_eq!(total_stock(&p, &vs), 12);
    }

    #[test]
    fn variants_of_other_products_are_not_counted() {
        let p = product(SizePolicy::Multiple, 0);
        let mut foreign = variant(9, 30, true);
        foreign.product_id = 8;
        assert_eq!(total_stock(&p, &[variant(1, 3, true), foreign]), 3);
    }

    #[test]
    fn large_counts_do_not_overflow() {
        let p = product(SizePolicy::Multiple, 0);
        let vs = vec![variant(1, i32::MAX, true), variant(2, i32::MAX, true)];
        assert_eq!(total_stock(&p, &vs), 2 * i64::from(i32::MAX));
    }

    #[test]
    fn unit_price_adds_adjustment() {
        let p = product(SizePolicy::Multiple, 0);
        let mut v = variant(1, 1, true);
        v.price_adjustment = Decimal::new(-1_000, 2);
        assert_eq!(unit_price(&p, &v), Decimal::new(18_900, 2));
    }

    #[test]
    fn summary_lists_variants_needing_reorder() {
        let p = product(SizePolicy::Multiple, 0);
        let vs = vec![variant(1, 2, true), variant(2, 3, true), variant(3, 0, false)];
        let summary = StockSummary::compute(&p, &vs);
        assert_eq!(summary.total_stock, 5);
        assert_eq!(summary.active_variants, 2);
        assert_eq!(summary.reorder_skus, vec!["SKU-1".to_string()]);
    }

    #[test]
    fn summary_for_single_policy_has_no_variants() {
        let p = product(SizePolicy::Single, 4);
        let summary = StockSummary::compute(&p, &[variant(1, 0, true)]);
        assert_eq!(summary.total_stock, 4);
        assert_eq!(summary.active_variants, 0);
        assert!(summary.reorder_skus.is_empty());
    }
}
