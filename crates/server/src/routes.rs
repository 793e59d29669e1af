use std::sync::Arc;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::get,
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::IntoParams;

use common::types::Health;
use service::pagination::{PageRequest, Sort, DEFAULT_PAGE_SIZE};
use service::password::Argon2Encoder;
use service::users::{SeaOrmUserRepository, UserService};

use crate::errors::{stamp_error_path, JsonApiError};
use crate::openapi;

pub mod categories;
pub mod products;
pub mod roles;
pub mod users;

pub type Users = UserService<SeaOrmUserRepository, Argon2Encoder>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub users: Arc<Users>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        let repo = Arc::new(SeaOrmUserRepository::new(db.clone()));
        let users = Arc::new(UserService::new(repo, Arc::new(Argon2Encoder::new())));
        Self { db, users }
    }
}

/// `?page=0&size=20&sort=name,desc`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 0-based page index
    pub page: Option<u64>,
    /// items per page, 1..=100
    pub size: Option<u64>,
    /// `property[,asc|desc]`
    pub sort: Option<String>,
}

impl ListQuery {
    pub fn page_request(self) -> Result<PageRequest, JsonApiError> {
        let mut req = PageRequest::new(self.page.unwrap_or(0), self.size.unwrap_or(DEFAULT_PAGE_SIZE));
        if let Some(raw) = self.sort.filter(|s| !s.trim().is_empty()) {
            req = req.with_sort(raw.parse::<Sort>()?);
        }
        Ok(req)
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", get(users::get).put(users::update).delete(users::delete))
        .route("/roles", get(roles::list))
        .route("/roles/:id", get(roles::get))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/:id", get(categories::get).put(categories::update).delete(categories::delete))
        .route("/products", get(products::list).post(products::create))
        .route("/products/:id", get(products::get).put(products::update).delete(products::delete));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .merge(api)
        .with_state(state)
        .layer(middleware::from_fn(stamp_error_path))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults() {
        let req = ListQuery::default().page_request().unwrap();
        assert_eq!(req, PageRequest::default());
    }

    #[test]
    fn list_query_parses_sort() {
        let q = ListQuery { page: Some(2), size: Some(5), sort: Some("name,desc".into()) };
        let req = q.page_request().unwrap();
        assert_eq!(req.page, 2);
        assert_eq!(req.size, 5);
        assert_eq!(req.sort, Some(Sort::desc("name")));
    }

    #[test]
    fn list_query_rejects_bad_direction() {
        let q = ListQuery { sort: Some("name,up".into()), ..ListQuery::default() };
        assert_eq!(q.page_request().unwrap_err().status, axum::http::StatusCode::BAD_REQUEST);
    }
}
