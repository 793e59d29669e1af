//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Translates low-level persistence failures into `ServiceError`.

pub mod errors;
pub mod pagination;
pub mod password;
pub mod users;
pub mod roles;
pub mod categories;
pub mod products;
#[cfg(test)]
pub mod test_support;
