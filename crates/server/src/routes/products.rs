use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use service::products::{self, ProductDto, ProductInput};
use service::pagination::Page;

use super::{AppState, ListQuery};
use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};

#[utoipa::path(get, path = "/products", tag = "products", params(ListQuery),
    responses((status = 200, description = "One page of products", body = crate::openapi::ProductPageDoc)))]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<ListQuery>) -> Result<Json<Page<ProductDto>>, JsonApiError> {
    Ok(Json(products::list_products(&state.db, q.page_request()?).await?))
}

#[utoipa::path(get, path = "/products/{id}", tag = "products", params(("id" = i64, Path, description = "Product id")),
    responses((status = 200, description = "Product", body = crate::openapi::ProductDoc), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<Json<ProductDto>, JsonApiError> {
    Ok(Json(products::get_product(&state.db, id).await?))
}

#[utoipa::path(post, path = "/products", tag = "products", request_body = crate::openapi::ProductInputDoc,
    responses((status = 201, description = "Created", body = crate::openapi::ProductDoc), (status = 400, description = "Invalid input"), (status = 404, description = "Unknown category")))]
pub async fn create(State(state): State<AppState>, ApiJson(input): ApiJson<ProductInput>) -> Result<(StatusCode, Json<ProductDto>), JsonApiError> {
    input.validate()?;
    let created = products::create_product(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/products/{id}", tag = "products", params(("id" = i64, Path, description = "Product id")), request_body = crate::openapi::ProductInputDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::ProductDoc), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<ProductDto>, JsonApiError> {
    input.validate()?;
    Ok(Json(products::update_product(&state.db, id, input).await?))
}

#[utoipa::path(delete, path = "/products/{id}", tag = "products", params(("id" = i64, Path, description = "Product id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"), (status = 409, description = "Still referenced")))]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> Result<StatusCode, JsonApiError> {
    products::delete_product(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
