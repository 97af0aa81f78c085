//! Product write handlers, the size-policy switch and stock summaries.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrine_core::{total_stock, Product, SizePolicy, StockSummary};

use crate::middleware::RequestId;

use super::super::{map_db_error, map_write_error, not_found, ApiError, ApiResponse, AppState};
use super::{deleted, non_negative_count, non_negative_price, required_name};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub size_policy: SizePolicy,
    #[serde(default)]
    pub stock_quantity: i32,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    pub is_active: Option<bool>,
    pub stock_quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SizePolicyRequest {
    pub size_policy: SizePolicy,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(in crate::api) struct AdminProductItem {
    #[serde(flatten)]
    product: Product,
    total_stock: i64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SizePolicyResponse {
    product_id: i64,
    size_policy: SizePolicy,
    deleted_variants: u64,
}

async fn load_product(state: &AppState, rid: &str, id: i64) -> Result<Product, ApiError> {
    vitrine_db::get_product(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.to_owned(), &e))?
        .ok_or_else(|| not_found(rid, "product", id))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/products: every product, active or not, with total stock.
pub(in crate::api) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<AdminProductItem>>>, ApiError> {
    let rid = &req_id.0;
    let products = vitrine_db::list_all_products(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let variants = vitrine_db::list_variants_for(&state.pool, &ids)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let data = products
        .into_iter()
        .map(|product| AdminProductItem {
            total_stock: total_stock(&product, &variants),
            product,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// POST /api/v1/admin/products
pub(in crate::api) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;
    let new = vitrine_db::NewProduct {
        name: required_name(rid, "name", &body.name)?,
        description: body.description.map(|d| d.trim().to_owned()),
        base_price: non_negative_price(rid, "base_price", body.base_price)?,
        is_active: body.is_active,
        size_policy: body.size_policy,
        stock_quantity: non_negative_count(rid, "stock_quantity", body.stock_quantity)?,
    };

    let product = vitrine_db::create_product(&state.pool, &new)
        .await
        .map_err(|e| map_write_error(rid, &e, "product conflicts with an existing record"))?;
    tracing::info!(product_id = product.id, "product created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(product, req_id.0))))
}

/// GET /api/v1/admin/products/:id
pub(in crate::api) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AdminProductItem>>, ApiError> {
    let rid = &req_id.0;
    let product = load_product(&state, rid, id).await?;
    let variants = vitrine_db::list_variants(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let item = AdminProductItem {
        total_stock: total_stock(&product, &variants),
        product,
    };
    Ok(Json(ApiResponse::new(item, req_id.0)))
}

/// PATCH /api/v1/admin/products/:id: sparse update; the size policy has its own endpoint.
pub(in crate::api) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;
    let patch = vitrine_db::ProductPatch {
        name: body
            .name
            .as_deref()
            .map(|n| required_name(rid, "name", n))
            .transpose()?,
        description: body.description.map(|d| d.trim().to_owned()),
        base_price: body
            .base_price
            .map(|p| non_negative_price(rid, "base_price", p))
            .transpose()?,
        is_active: body.is_active,
        stock_quantity: body
            .stock_quantity
            .map(|q| non_negative_count(rid, "stock_quantity", q))
            .transpose()?,
    };

    let product = vitrine_db::update_product(&state.pool, id, &patch)
        .await
        .map_err(|e| map_write_error(rid, &e, "product conflicts with an existing record"))?
        .ok_or_else(|| not_found(rid, "product", id))?;

    Ok(Json(ApiResponse::new(product, req_id.0)))
}

/// DELETE /api/v1/admin/products/:id: images, variants and links go with it.
pub(in crate::api) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::delete_product(&state.pool, id)
        .await
        .map_err(|e| map_write_error(rid, &e, "product is still referenced"))?;
    if !removed {
        return Err(not_found(rid, "product", id));
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(deleted(req_id.0))
}

/// PUT /api/v1/admin/products/:id/size-policy: switching to single deletes all variants.
pub(in crate::api) async fn set_size_policy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<SizePolicyRequest>,
) -> Result<Json<ApiResponse<SizePolicyResponse>>, ApiError> {
    let rid = &req_id.0;
    let deleted_variants = vitrine_db::set_size_policy(&state.pool, id, body.size_policy)
        .await
        .map_err(|e| match e {
            vitrine_db::DbError::NotFound => not_found(rid, "product", id),
            other => map_write_error(rid, &other, "size policy change conflicts"),
        })?;

    Ok(Json(ApiResponse::new(
        SizePolicyResponse {
            product_id: id,
            size_policy: body.size_policy,
            deleted_variants,
        },
        req_id.0,
    )))
}

/// GET /api/v1/admin/products/:id/stock
pub(in crate::api) async fn stock_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<StockSummary>>, ApiError> {
    let rid = &req_id.0;
    let product = load_product(&state, rid, id).await?;
    let variants = vitrine_db::list_variants(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        StockSummary::compute(&product, &variants),
        req_id.0,
    )))
}
