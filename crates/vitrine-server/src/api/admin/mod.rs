//! Catalog management API, mounted under `/api/v1/admin`.
//!
//! - `/products`, `/products/:id`, `/products/:id/size-policy`, `/products/:id/stock`
//! - `/products/:id/variants`, `/variants/:id`
//! - `/products/:id/images`, `/products/:id/images/:image_id`
//! - `/products/:id/categories`, `/products/:id/categories/:category_id`
//! - `/sizes`, `/sizes/:id`
//! - `/categories`, `/categories/:id`, `/categories/:id/parent`
//! - `/groups`, `/groups/:id`, `/groups/:id/members`, `/groups/:id/members/:product_id`

mod categories;
mod groups;
mod images;
mod products;
mod sizes;
mod variants;

use axum::{
    routing::{delete, get, patch, put},
    Router,
};
use rust_decimal::Decimal;

use super::{ApiError, AppState};

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
        .route(
            "/products/{id}/size-policy",
            put(products::set_size_policy),
        )
        .route("/products/{id}/stock", get(products::stock_summary))
        .route(
            "/products/{id}/variants",
            get(variants::list_variants).post(variants::create_variant),
        )
        .route(
            "/variants/{id}",
            patch(variants::update_variant).delete(variants::delete_variant),
        )
        .route(
            "/products/{id}/images",
            get(images::list_images).post(images::add_image),
        )
        .route(
            "/products/{id}/images/{image_id}",
            delete(images::delete_image),
        )
        .route(
            "/products/{id}/categories",
            axum::routing::post(categories::link_product),
        )
        .route(
            "/products/{id}/categories/{category_id}",
            delete(categories::unlink_product),
        )
        .route(
            "/sizes",
            get(sizes::list_sizes).post(sizes::create_size),
        )
        .route("/sizes/{id}", delete(sizes::delete_size))
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/{id}", delete(categories::delete_category))
        .route("/categories/{id}/parent", put(categories::set_parent))
        .route(
            "/groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route("/groups/{id}", delete(groups::delete_group))
        .route(
            "/groups/{id}/members",
            get(groups::list_members).post(groups::add_member),
        )
        .route(
            "/groups/{id}/members/{product_id}",
            delete(groups::remove_member),
        )
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Trims `value` and requires 1 to 200 characters.
fn required_name(request_id: &str, field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 200 {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("{field} must be 1-200 characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Exclusive bound on a stored amount's magnitude; prices are `NUMERIC(10, 2)`.
const PRICE_LIMIT: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

fn non_negative_price(request_id: &str, field: &str, value: Decimal) -> Result<Decimal, ApiError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("{field} must be zero or more, got {value}"),
        ));
    }
    within_price_limit(request_id, field, value)
}

/// Rounds to cents and rejects amounts the price columns cannot hold.
/// Negative values are allowed.
fn within_price_limit(request_id: &str, field: &str, value: Decimal) -> Result<Decimal, ApiError> {
    let rounded = value.round_dp(2);
    if rounded.abs() >= PRICE_LIMIT {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("{field} must be below {PRICE_LIMIT} in magnitude, got {value}"),
        ));
    }
    Ok(rounded)
}

fn non_negative_count(request_id: &str, field: &str, value: i32) -> Result<i32, ApiError> {
    if value < 0 {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            format!("{field} must be zero or more, got {value}"),
        ));
    }
    Ok(value)
}

fn deleted(request_id: String) -> axum::Json<super::ApiResponse<serde_json::Value>> {
    axum::Json(super::ApiResponse::new(
        serde_json::json!({ "deleted": true }),
        request_id,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_name_trims_and_bounds() {
        assert_eq!(required_name("r", "name", "  Watch ").unwrap(), "Watch");
        assert!(required_name("r", "name", "   ").is_err());
        assert!(required_name("r", "name", &"x".repeat(201)).is_err());
    }

    #[test]
    fn non_negative_price_rejects_negative_and_rounds() {
        assert!(non_negative_price("r", "base_price", Decimal::new(-1, 2)).is_err());
        assert_eq!(
            non_negative_price("r", "base_price", Decimal::new(19_999, 3)).unwrap(),
            Decimal::new(2_000, 2)
        );
    }

    #[test]
    fn prices_at_or_above_limit_are_rejected() {
        let price = |value| non_negative_price("r", "base_price", value);
        assert!(price(Decimal::new(12_345_678_901_200, 2)).is_err());
        assert!(price(Decimal::new(100_000_000, 0)).is_err());
        // Rounds up to the limit.
        assert!(price(Decimal::new(99_999_999_999, 3)).is_err());
        assert_eq!(
            price(Decimal::new(9_999_999_999, 2)).unwrap(),
            Decimal::new(9_999_999_999, 2)
        );
    }

    #[test]
    fn price_adjustment_may_be_negative_but_bounded() {
        assert_eq!(
            within_price_limit("r", "price_adjustment", Decimal::new(-2_507, 3)).unwrap(),
            Decimal::new(-251, 2)
        );
        let adjustment = |value| within_price_limit("r", "price_adjustment", value);
        assert!(adjustment(Decimal::new(-100_000_000, 0)).is_err());
        assert!(adjustment(Decimal::new(100_000_000, 0)).is_err());
    }

    #[test]
    fn non_negative_count_rejects_negative() {
        assert!(non_negative_count("r", "stock_quantity", -1).is_err());
        assert_eq!(non_negative_count("r", "stock_quantity", 0).unwrap(), 0);
    }
}
