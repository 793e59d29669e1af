use axum::Json;
use chrono::{DateTime, Utc};
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RoleDoc { pub id: i64, pub authority: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<RoleDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserInsertDoc {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role_ids: Vec<i64>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserUpdateDoc {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_ids: Vec<i64>,
}

#[derive(ToSchema)]
pub struct CategoryDoc { pub id: i64, pub name: String }

#[derive(ToSchema)]
pub struct CategoryInputDoc { pub name: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductDoc {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTime<Utc>,
    pub categories: Vec<CategoryDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProductInputDoc {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTime<Utc>,
    pub category_ids: Vec<i64>,
}

#[derive(ToSchema)]
#[aliases(UserPageDoc = PageDoc<UserDoc>, CategoryPageDoc = PageDoc<CategoryDoc>, ProductPageDoc = PageDoc<ProductDoc>)]
#[schema(rename_all = "camelCase")]
pub struct PageDoc<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u64,
    pub size: u64,
}

#[derive(ToSchema)]
pub struct ErrorDoc {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::list,
        crate::routes::users::get,
        crate::routes::users::create,
        crate::routes::users::update,
        crate::routes::users::delete,
        crate::routes::roles::list,
        crate::routes::roles::get,
        crate::routes::categories::list,
        crate::routes::categories::get,
        crate::routes::categories::create,
        crate::routes::categories::update,
        crate::routes::categories::delete,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
    ),
    components(
        schemas(
            HealthResponse,
            RoleDoc,
            UserDoc,
            UserInsertDoc,
            UserUpdateDoc,
            CategoryDoc,
            CategoryInputDoc,
            ProductDoc,
            ProductInputDoc,
            UserPageDoc,
            CategoryPageDoc,
            ProductPageDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "roles"),
        (name = "categories"),
        (name = "products")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
