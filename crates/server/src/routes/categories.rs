use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use service::categories::{self, CategoryDto, CategoryInput};
use service::pagination::Page;

use super::{AppState, ListQuery};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

#[utoipa::path(get, path = "/categories", tag = "categories", params(ListQuery),
    responses((status = 200, description = "One page of categories", body = crate::openapi::CategoryPageDoc)))]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<ListQuery>) -> Result<Json<Page<CategoryDto>>, JsonApiError> {
    Ok(Json(categories::list_categories(&state.db, q.page_request()?).await?))
}

#[utoipa::path(get, path = "/categories/{id}", tag = "categories", params(("id" = i64, Path, description = "Category id")),
    responses((status = 200, description = "Category", body = crate::openapi::CategoryDoc), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<CategoryDto>, JsonApiError> {
    Ok(Json(categories::get_category(&state.db, id).await?))
}

#[utoipa::path(post, path = "/categories", tag = "categories", request_body = crate::openapi::CategoryInputDoc,
    responses((status = 201, description = "Created", body = crate::openapi::CategoryDoc), (status = 400, description = "Invalid input")))]
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<CategoryInput>) -> Result<(StatusCode, Json<CategoryDto>), JsonApiError> {
    input.validate()?;
    let created = categories::create_category(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/categories/{id}", tag = "categories", params(("id" = i64, Path, description = "Category id")), request_body = crate::openapi::CategoryInputDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::CategoryDoc), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<CategoryDto>, JsonApiError> {
    input.validate()?;
    Ok(Json(categories::update_category(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/categories/{id}", tag = "categories", params(("id" = i64, Path, description = "Category id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"), (status = 409, description = "Products still reference it")))]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    categories::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
