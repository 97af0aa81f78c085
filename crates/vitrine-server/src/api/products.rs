//! Public storefront catalog endpoints.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use vitrine_core::{PresentedProduct, ProductDetail, RawProductQuery};

use crate::middleware::RequestId;

use super::{map_db_error, not_found, origin::request_origin, ApiError, AppState};

/// GET /api/v1/products: active products as a bare JSON array.
///
/// Malformed price bounds are dropped, never a 400. Parameters arrive as raw
/// pairs so a repeated key cannot fail extraction; the last value wins.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<PresentedProduct>>, ApiError> {
    let (filters, ignored) = RawProductQuery::from_pairs(pairs).to_filters();
    if !ignored.is_empty() {
        tracing::debug!(request_id = %req_id.0, ?ignored, "ignoring non-numeric price filters");
    }

    let origin = request_origin(&state, &headers);
    let products = vitrine_core::list_products(&state.catalog, &filters, &origin)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(products))
}

/// GET /api/v1/products/:id: detail view of an active product.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ProductDetail>, ApiError> {
    let origin = request_origin(&state, &headers);
    vitrine_core::get_product_detail(&state.catalog, id, &origin)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .map(Json)
        .ok_or_else(|| not_found(&req_id.0, "product", id))
}
