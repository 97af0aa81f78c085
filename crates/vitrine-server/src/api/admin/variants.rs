use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use vitrine_core::ProductVariant;

use crate::middleware::RequestId;

use super::super::{map_db_error, map_write_error, not_found, ApiError, ApiResponse, AppState};
use super::{deleted, non_negative_count, required_name, within_price_limit};

const SKU_CONFLICT: &str = "sku already exists, or the product already has a variant in that size";

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateVariantRequest {
    pub size_id: i64,
    pub sku: String,
    #[serde(default)]
    pub price_adjustment: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub reorder_threshold: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateVariantRequest {
    pub price_adjustment: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub reorder_threshold: Option<i32>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}

/// GET /api/v1/admin/products/:id/variants
pub(in crate::api) async fn list_variants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ProductVariant>>>, ApiError> {
    let variants = vitrine_db::list_variants(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(variants, req_id.0)))
}

/// POST /api/v1/admin/products/:id/variants: refused for single-size products.
pub(in crate::api) async fn create_variant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
    Json(body): Json<CreateVariantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductVariant>>), ApiError> {
    let rid = &req_id.0;
    let new = vitrine_db::NewVariant {
        product_id,
        size_id: body.size_id,
        sku: required_name(rid, "sku", &body.sku)?,
        price_adjustment: within_price_limit(rid, "price_adjustment", body.price_adjustment)?,
        stock_quantity: non_negative_count(rid, "stock_quantity", body.stock_quantity)?,
        reorder_threshold: non_negative_count(rid, "reorder_threshold", body.reorder_threshold)?,
        is_active: body.is_active,
    };

    let variant = vitrine_db::create_variant(&state.pool, &new)
        .await
        .map_err(|e| match e {
            vitrine_db::DbError::NotFound => not_found(rid, "product", product_id),
            other => map_write_error(rid, &other, SKU_CONFLICT),
        })?;
    tracing::info!(product_id, variant_id = variant.id, sku = %variant.sku, "variant created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(variant, req_id.0))))
}

/// PATCH /api/v1/admin/variants/:id
pub(in crate::api) async fn update_variant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateVariantRequest>,
) -> Result<Json<ApiResponse<ProductVariant>>, ApiError> {
    let rid = &req_id.0;
    let patch = vitrine_db::VariantPatch {
        price_adjustment: body
            .price_adjustment
            .map(|p| within_price_limit(rid, "price_adjustment", p))
            .transpose()?,
        stock_quantity: body
            .stock_quantity
            .map(|q| non_negative_count(rid, "stock_quantity", q))
            .transpose()?,
        reorder_threshold: body
            .reorder_threshold
            .map(|q| non_negative_count(rid, "reorder_threshold", q))
            .transpose()?,
        is_active: body.is_active,
    };

    let variant = vitrine_db::update_variant(&state.pool, id, &patch)
        .await
        .map_err(|e| map_write_error(rid, &e, SKU_CONFLICT))?
        .ok_or_else(|| not_found(rid, "variant", id))?;

    Ok(Json(ApiResponse::new(variant, req_id.0)))
}

/// DELETE /api/v1/admin/variants/:id
pub(in crate::api) async fn delete_variant(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::delete_variant(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(not_found(rid, "variant", id));
    }
    Ok(deleted(req_id.0))
}
