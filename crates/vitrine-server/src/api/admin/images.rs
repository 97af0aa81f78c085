use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use vitrine_core::{ImageType, ProductImage};

use crate::middleware::RequestId;

use super::super::{map_db_error, map_write_error, not_found, ApiError, ApiResponse, AppState};
use super::{deleted, non_negative_count};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct AddImageRequest {
    pub image_url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub image_type: ImageType,
    #[serde(default)]
    pub display_order: i32,
}

/// GET /api/v1/admin/products/:id/images: stored URLs, not resolved.
pub(in crate::api) async fn list_images(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ProductImage>>>, ApiError> {
    let images = vitrine_db::list_images(&state.pool, product_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(images, req_id.0)))
}

/// POST /api/v1/admin/products/:id/images
pub(in crate::api) async fn add_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
    Json(body): Json<AddImageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductImage>>), ApiError> {
    let rid = &req_id.0;
    let image_url = body.image_url.trim();
    if image_url.is_empty() {
        return Err(ApiError::new(
            rid.as_str(),
            "validation_error",
            "image_url must not be empty",
        ));
    }

    let new = vitrine_db::NewImage {
        product_id,
        image_url: image_url.to_owned(),
        alt_text: body
            .alt_text
            .map(|a| a.trim().to_owned())
            .filter(|a| !a.is_empty()),
        image_type: body.image_type,
        display_order: non_negative_count(rid, "display_order", body.display_order)?,
    };

    let image = vitrine_db::add_image(&state.pool, &new)
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                not_found(rid, "product", product_id)
            } else {
                map_write_error(rid, &e, "image conflicts with an existing record")
            }
        })?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(image, req_id.0))))
}

/// DELETE /api/v1/admin/products/:id/images/:image_id
pub(in crate::api) async fn delete_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::delete_image(&state.pool, product_id, image_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(not_found(rid, "image", image_id));
    }
    Ok(deleted(req_id.0))
}
