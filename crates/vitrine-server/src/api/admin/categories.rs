//! Category tree management and product-category links.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vitrine_core::Category;
use vitrine_db::DbError;

use crate::middleware::RequestId;

use super::super::{map_db_error, map_write_error, not_found, ApiError, ApiResponse, AppState};
use super::{deleted, non_negative_count, required_name};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateCategoryRequest {
    pub name: String,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SetParentRequest {
    /// `null` moves the category to the root.
    pub parent_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct LinkRequest {
    pub category_id: i64,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct LinkResponse {
    product_id: i64,
    category_id: i64,
    display_order: i32,
}

/// GET /api/v1/admin/categories
pub(in crate::api) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = vitrine_db::list_categories(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(categories, req_id.0)))
}

/// POST /api/v1/admin/categories: names are unique ignoring case.
pub(in crate::api) async fn create_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), ApiError> {
    let rid = &req_id.0;
    let name = required_name(rid, "name", &body.name)?;
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let category = vitrine_db::create_category(&state.pool, &name, body.parent_id, description)
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                ApiError::new(rid.as_str(), "validation_error", "parent category does not exist")
            } else {
                map_write_error(rid, &e, &format!("category {name} already exists"))
            }
        })?;
    tracing::info!(category_id = category.id, "category created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(category, req_id.0))))
}

/// PUT /api/v1/admin/categories/:id/parent: rejects moves that would form a cycle.
pub(in crate::api) async fn set_parent(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<SetParentRequest>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    let rid = &req_id.0;
    let category = vitrine_db::set_category_parent(&state.pool, id, body.parent_id)
        .await
        .map_err(|e| match e {
            DbError::NotFound => ApiError::new(
                rid.as_str(),
                "not_found",
                "category or parent category not found",
            ),
            other => map_write_error(rid, &other, "category move conflicts"),
        })?;

    Ok(Json(ApiResponse::new(category, req_id.0)))
}

/// DELETE /api/v1/admin/categories/:id: children move to the root.
pub(in crate::api) async fn delete_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::delete_category(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(not_found(rid, "category", id));
    }
    Ok(deleted(req_id.0))
}

/// POST /api/v1/admin/products/:id/categories
pub(in crate::api) async fn link_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
    Json(body): Json<LinkRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LinkResponse>>), ApiError> {
    let rid = &req_id.0;
    let display_order = non_negative_count(rid, "display_order", body.display_order)?;

    vitrine_db::link_product_category(&state.pool, product_id, body.category_id, display_order)
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                ApiError::new(rid.as_str(), "not_found", "product or category not found")
            } else {
                map_write_error(rid, &e, "product is already in that category")
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            LinkResponse {
                product_id,
                category_id: body.category_id,
                display_order,
            },
            req_id.0,
        )),
    ))
}

/// DELETE /api/v1/admin/products/:id/categories/:category_id
pub(in crate::api) async fn unlink_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((product_id, category_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::unlink_product_category(&state.pool, product_id, category_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(ApiError::new(
            rid.as_str(),
            "not_found",
            format!("product {product_id} is not in category {category_id}"),
        ));
    }
    Ok(deleted(req_id.0))
}
