//! Migrator registering catalog migrations in dependency order.
//! Seed data is applied last.
pub use sea_orm_migration::prelude::*;

mod m20220101_000001_create_category;
mod m20220101_000002_create_product;
mod m20220101_000003_create_product_category;
mod m20220101_000004_create_role;
mod m20220101_000005_create_user;
mod m20220101_000006_create_user_role;
mod m20220101_000007_seed_roles;

pub use m20220101_000007_seed_roles::SEEDED_AUTHORITIES;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_create_category::Migration),
            Box::new(m20220101_000002_create_product::Migration),
            Box::new(m20220101_000003_create_product_category::Migration),
            Box::new(m20220101_000004_create_role::Migration),
            Box::new(m20220101_000005_create_user::Migration),
            Box::new(m20220101_000006_create_user_role::Migration),
            Box::new(m20220101_000007_seed_roles::Migration),
        ]
    }
}
