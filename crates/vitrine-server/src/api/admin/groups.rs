use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use vitrine_core::ProductGroup;

use crate::middleware::RequestId;

use super::super::{map_db_error, map_write_error, not_found, ApiError, ApiResponse, AppState};
use super::{deleted, non_negative_count, required_name};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct AddMemberRequest {
    pub product_id: i64,
    #[serde(default)]
    pub display_order: i32,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct GroupMember {
    product_id: i64,
    product_name: String,
    display_order: i32,
}

impl From<vitrine_db::GroupMemberRow> for GroupMember {
    fn from(row: vitrine_db::GroupMemberRow) -> Self {
        Self {
            product_id: row.product_id,
            product_name: row.product_name,
            display_order: row.display_order,
        }
    }
}

fn default_true() -> bool {
    true
}

/// GET /api/v1/admin/groups
pub(in crate::api) async fn list_groups(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ProductGroup>>>, ApiError> {
    let groups = vitrine_db::list_groups(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(groups, req_id.0)))
}

/// POST /api/v1/admin/groups
pub(in crate::api) async fn create_group(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductGroup>>), ApiError> {
    let rid = &req_id.0;
    let name = required_name(rid, "name", &body.name)?;
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let group = vitrine_db::create_group(&state.pool, &name, description, body.is_active)
        .await
        .map_err(|e| map_write_error(rid, &e, &format!("group {name} already exists")))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(group, req_id.0))))
}

/// DELETE /api/v1/admin/groups/:id
pub(in crate::api) async fn delete_group(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::delete_group(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(not_found(rid, "group", id));
    }
    Ok(deleted(req_id.0))
}

/// GET /api/v1/admin/groups/:id/members: in display order.
pub(in crate::api) async fn list_members(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(group_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<GroupMember>>>, ApiError> {
    let members = vitrine_db::list_group_members(&state.pool, group_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let data = members.into_iter().map(GroupMember::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// POST /api/v1/admin/groups/:id/members
pub(in crate::api) async fn add_member(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(group_id): Path<i64>,
    Json(body): Json<AddMemberRequest>,
) -> Result<StatusCode, ApiError> {
    let rid = &req_id.0;
    let display_order = non_negative_count(rid, "display_order", body.display_order)?;

    vitrine_db::add_group_member(&state.pool, group_id, body.product_id, display_order)
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                ApiError::new(rid.as_str(), "not_found", "group or product not found")
            } else {
                map_write_error(rid, &e, "product is already in that group")
            }
        })?;
    tracing::info!(group_id, product_id = body.product_id, "group member added");

    Ok(StatusCode::CREATED)
}

/// DELETE /api/v1/admin/groups/:id/members/:product_id
pub(in crate::api) async fn remove_member(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((group_id, product_id)): Path<(i64, i64)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    let removed = vitrine_db::remove_group_member(&state.pool, group_id, product_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    if !removed {
        return Err(ApiError::new(
            rid.as_str(),
            "not_found",
            format!("product {product_id} is not in group {group_id}"),
        ));
    }
    Ok(deleted(req_id.0))
}
