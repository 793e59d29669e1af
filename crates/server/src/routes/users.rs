use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use service::pagination::Page;
use service::users::{UserDetail, UserInsertInput, UserUpdateInput};

use super::{AppState, ListQuery};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

#[utoipa::path(get, path = "/users", tag = "users", params(ListQuery),
    responses((status = 200, description = "One page of users", body = crate::openapi::UserPageDoc), (status = 400, description = "Bad sort")))]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<ListQuery>) -> Result<Json<Page<UserDetail>>, JsonApiError> {
    let page = state.users.list(q.page_request()?).await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/users/{id}", tag = "users", params(("id" = i64, Path, description = "User id")),
    responses((status = 200, description = "User", body = crate::openapi::UserDoc), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<UserDetail>, JsonApiError> {
    Ok(Json(state.users.get_by_id(id).await?))
}

#[utoipa::path(post, path = "/users", tag = "users", request_body = crate::openapi::UserInsertDoc,
    responses((status = 201, description = "Created", body = crate::openapi::UserDoc), (status = 400, description = "Invalid input"),
        (status = 404, description = "Unknown role"), (status = 409, description = "Email in use")))]
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<UserInsertInput>) -> Result<(StatusCode, Json<UserDetail>), JsonApiError> {
    input.validate()?;
    let created = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/users/{id}", tag = "users", params(("id" = i64, Path, description = "User id")), request_body = crate::openapi::UserUpdateDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::UserDoc), (status = 404, description = "Unknown user or role")))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UserUpdateInput>,
) -> Result<Json<UserDetail>, JsonApiError> {
    input.validate()?;
    Ok(Json(state.users.update(id, input).await?))
}

#[utoipa::path(delete, path = "/users/{id}", tag = "users", params(("id" = i64, Path, description = "User id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"), (status = 409, description = "Still referenced")))]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
