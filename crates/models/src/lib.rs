//! SeaORM entities for the catalog schema plus the field checks shared by
//! the HTTP layer and the services.

pub mod errors;
pub mod db;
pub mod category;
pub mod product;
pub mod product_category;
pub mod role;
pub mod user;
pub mod user_role;

#[cfg(test)]
mod tests;
