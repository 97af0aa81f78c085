use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use vitrine_core::ProductSize;

use crate::middleware::RequestId;

use super::super::{map_db_error, map_write_error, not_found, ApiError, ApiResponse, AppState};
use super::{deleted, non_negative_count, required_name};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateSizeRequest {
    pub size_code: String,
    pub size_name: String,
    #[serde(default)]
    pub display_order: i32,
}

/// GET /api/v1/admin/sizes: in display order.
pub(in crate::api) async fn list_sizes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductSize>>>, ApiError> {
    let sizes = vitrine_db::list_sizes(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(sizes, req_id.0)))
}

/// POST /api/v1/admin/sizes: size codes are unique.
pub(in crate::api) async fn create_size(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateSizeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductSize>>), ApiError> {
    let rid = &req_id.0;
    let code = required_name(rid, "size_code", &body.size_code)?;
    let name = required_name(rid, "size_name", &body.size_name)?;
    let order = non_negative_count(rid, "display_order", body.display_order)?;

    let size = vitrine_db::create_size(&state.pool, &code, &name, order)
        .await
        .map_err(|e| map_write_error(rid, &e, &format!("size code {code} already exists")))?;
    tracing::info!(size_id = size.id, size_code = %size.size_code, "size created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new(size, req_id.0))))
}

/// DELETE /api/v1/admin/sizes/:id: refused while variants use the size.
pub(in crate::api) async fn delete_size(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::delete_size(&state.pool, id)
        .await
        .map_err(|e| map_write_error(rid, &e, "size is still in use"))?;
    if !removed {
        return Err(not_found(rid, "size", id));
    }
    Ok(deleted(req_id.0))
}
