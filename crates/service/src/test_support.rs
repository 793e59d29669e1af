#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use models::db::{connect_with_config, DatabaseConfig};
use models::role;

/// Fresh migrated SQLite database per test; roles 1 and 2 are seeded.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let path = std::env::temp_dir().join(format!("dscatalog_service_{}.db", Uuid::new_v4()));
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub async fn add_role(db: &DatabaseConnection, id: i64, authority: &str) -> Result<role::Model, anyhow::Error> {
    let am = role::ActiveModel { id: Set(id), authority: Set(authority.into()) };
    Ok(am.insert(db).await?)
}

/// Cheap encoder so bulk-insert tests do not pay for Argon2.
pub struct FastEncoder;

impl crate::password::PasswordEncoder for FastEncoder {
    fn encode(&self, raw: &str) -> Result<String, crate::errors::ServiceError> { Ok(format!("fast:{raw}")) }
    fn matches(&self, raw: &str, encoded: &str) -> bool { encoded == format!("fast:{raw}") }
}
