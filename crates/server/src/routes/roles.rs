use axum::{
    extract::State,
    Json,
};

use service::roles;
use service::users::RoleDto;

use super::AppState;
use crate::errors::JsonApiError;
use crate::extract::ApiPath;

#[utoipa::path(get, path = "/roles", tag = "roles", responses((status = 200, description = "All roles", body = [crate::openapi::RoleDoc])))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<RoleDto>>, JsonApiError> {
    Ok(Json(roles::list_roles(&state.db).await?))
}

#[utoipa::path(get, path = "/roles/{id}", tag = "roles", params(("id" = i64, Path, description = "Role id")),
    responses((status = 200, description = "Role", body = crate::openapi::RoleDoc), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<RoleDto>, JsonApiError> {
    Ok(Json(roles::get_role(&state.db, id).await?))
}
