//! `/api/permissions/...` handlers.
//!
//! Every handler goes through [`gostrike_core::permissions::store`]
//! directly — there's exactly one process-wide permission store, so no
//! `axum` `State` extractor is needed.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use gostrike_core::permissions::{self, PermissionError};

use crate::error::ApiError;
use crate::steamid;

fn store() -> Result<&'static permissions::PermissionStore, ApiError> {
    permissions::store().ok_or_else(|| ApiError::Internal(PermissionError::Closed))
}

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles).post(create_role))
        .route("/roles/:id", delete(delete_role))
        .route("/role-permissions", post(add_role_permission).delete(remove_role_permission))
        .route("/players", post(upsert_player))
        .route("/players/:steam_id", get(get_player).delete(delete_player))
        .route("/player-roles", post(assign_role).delete(unassign_role))
        .route("/player-permissions", post(add_player_permission).delete(remove_player_permission))
        .route("/registered", get(list_registered))
        .route("/check", get(check_permission))
        .route("/reload", post(reload))
}

#[derive(Serialize)]
struct RoleDto {
    id: i64,
    name: String,
    display_name: String,
    immunity: i64,
    permissions: Vec<String>,
}

impl From<permissions::Role> for RoleDto {
    fn from(role: permissions::Role) -> Self {
        let mut permissions: Vec<String> = role.permissions.into_iter().collect();
        permissions.sort();
        Self { id: role.id, name: role.name, display_name: role.display_name, immunity: role.immunity, permissions }
    }
}

#[derive(Serialize)]
struct PlayerDto {
    steam_id: String,
    name: String,
    immunity: i64,
    expires_at: i64,
    roles: Vec<i64>,
    permissions: Vec<String>,
}

impl From<permissions::PlayerRecord> for PlayerDto {
    fn from(player: permissions::PlayerRecord) -> Self {
        let mut roles: Vec<i64> = player.roles.into_iter().collect();
        roles.sort();
        let mut permissions: Vec<String> = player.permissions.into_iter().collect();
        permissions.sort();
        Self {
            steam_id: player.steam_id.to_string(),
            name: player.name,
            immunity: player.immunity,
            expires_at: player.expires_at,
            roles,
            permissions,
        }
    }
}

async fn list_roles() -> Result<Json<Vec<RoleDto>>, ApiError> {
    let mut roles: Vec<RoleDto> = store()?.list_roles().into_iter().map(RoleDto::from).collect();
    roles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(roles))
}

#[derive(Deserialize)]
struct CreateRoleRequest {
    name: String,
    display_name: String,
    #[serde(default)]
    immunity: i64,
}

async fn create_role(Json(body): Json<CreateRoleRequest>) -> Result<(StatusCode, Json<RoleDto>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    let id = store()?.create_role(&body.name, &body.display_name, body.immunity)?;
    let role = store()?.get_role_by_id(id).ok_or_else(|| ApiError::NotFound("role".to_string()))?;
    Ok((StatusCode::CREATED, Json(role.into())))
}

async fn delete_role(Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    if store()?.get_role_by_id(id).is_none() {
        return Err(ApiError::NotFound("role".to_string()));
    }
    store()?.delete_role(id)?;
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct RolePermissionRequest {
    role_id: i64,
    permission: String,
}

async fn add_role_permission(Json(body): Json<RolePermissionRequest>) -> Result<StatusCode, ApiError> {
    if store()?.get_role_by_id(body.role_id).is_none() {
        return Err(ApiError::NotFound("role".to_string()));
    }
    store()?.add_role_permission(body.role_id, &body.permission)?;
    Ok(StatusCode::CREATED)
}

async fn remove_role_permission(Json(body): Json<RolePermissionRequest>) -> Result<StatusCode, ApiError> {
    store()?.remove_role_permission(body.role_id, &body.permission)?;
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct UpsertPlayerRequest {
    #[serde(deserialize_with = "steamid::deserialize")]
    steam_id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    immunity: i64,
    #[serde(default)]
    expires_at: i64,
}

async fn upsert_player(Json(body): Json<UpsertPlayerRequest>) -> Result<(StatusCode, Json<PlayerDto>), ApiError> {
    let existed = store()?.get_player(body.steam_id).is_some();
    store()?.upsert_player(body.steam_id, &body.name, body.immunity, body.expires_at)?;
    let player = store()?.get_player(body.steam_id).ok_or_else(|| ApiError::NotFound("player".to_string()))?;
    let status = if existed { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(player.into())))
}

async fn get_player(Path(steam_id): Path<u64>) -> Result<Json<PlayerDto>, ApiError> {
    let player = store()?.get_player(steam_id).ok_or_else(|| ApiError::NotFound("player".to_string()))?;
    Ok(Json(player.into()))
}

async fn delete_player(Path(steam_id): Path<u64>) -> Result<StatusCode, ApiError> {
    if store()?.get_player(steam_id).is_none() {
        return Err(ApiError::NotFound("player".to_string()));
    }
    store()?.delete_player(steam_id)?;
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct PlayerRoleRequest {
    #[serde(deserialize_with = "steamid::deserialize")]
    steam_id: u64,
    role_id: i64,
}

async fn assign_role(Json(body): Json<PlayerRoleRequest>) -> Result<StatusCode, ApiError> {
    if store()?.get_role_by_id(body.role_id).is_none() {
        return Err(ApiError::NotFound("role".to_string()));
    }
    store()?.assign_role(body.steam_id, body.role_id)?;
    Ok(StatusCode::CREATED)
}

async fn unassign_role(Json(body): Json<PlayerRoleRequest>) -> Result<StatusCode, ApiError> {
    store()?.unassign_role(body.steam_id, body.role_id)?;
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct PlayerPermissionRequest {
    #[serde(deserialize_with = "steamid::deserialize")]
    steam_id: u64,
    permission: String,
}

async fn add_player_permission(Json(body): Json<PlayerPermissionRequest>) -> Result<StatusCode, ApiError> {
    store()?.add_player_permission(body.steam_id, &body.permission)?;
    Ok(StatusCode::CREATED)
}

async fn remove_player_permission(Json(body): Json<PlayerPermissionRequest>) -> Result<StatusCode, ApiError> {
    store()?.remove_player_permission(body.steam_id, &body.permission)?;
    Ok(StatusCode::OK)
}

#[derive(Serialize)]
struct RegisteredPermissionDto {
    name: String,
    description: String,
}

async fn list_registered() -> Result<Json<Vec<RegisteredPermissionDto>>, ApiError> {
    let mut registered: Vec<RegisteredPermissionDto> = store()?
        .list_registered_permissions()
        .into_iter()
        .map(|p| RegisteredPermissionDto { name: p.name, description: p.description })
        .collect();
    registered.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(registered))
}

#[derive(Deserialize)]
struct CheckQuery {
    steam_id: String,
    permission: String,
}

#[derive(Serialize)]
struct CheckResponse {
    allowed: bool,
}

async fn check_permission(Query(query): Query<CheckQuery>) -> Result<Json<CheckResponse>, ApiError> {
    let steam_id: u64 = query
        .steam_id
        .parse()
        .map_err(|_| ApiError::BadRequest("steam_id must be a 64-bit integer".to_string()))?;
    let allowed = store()?.has_permission(steam_id, &query.permission, permissions::now_unix());
    Ok(Json(CheckResponse { allowed }))
}

async fn reload() -> Result<StatusCode, ApiError> {
    store()?.reload()?;
    Ok(StatusCode::OK)
}
