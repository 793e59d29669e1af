//! User management: domain DTOs, repository gateway, service.
//!
//! The role set of a user is stored as explicit `(user_id, role_id)` pairs and
//! replaced wholesale on every write.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{RoleDto, UserDetail, UserInsertInput, UserUpdateInput};
pub use repo::SeaOrmUserRepository;
pub use service::UserService;
