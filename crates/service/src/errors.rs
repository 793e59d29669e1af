use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database conflict: {0}")]
    DatabaseConflict(String),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn referential_integrity() -> Self {
        Self::DatabaseConflict("Referential integrity constraint violation".into())
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self { Self::Db(e.to_string()) }
}

/// Low-level persistence failures, classified but not yet given a business
/// meaning. Services decide what each one means for their operation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The row addressed by a write does not exist.
    #[error("entity not found: {0}")]
    MissingEntity(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<DbErr> for RepositoryError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ForeignKeyViolation(msg),
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::UniqueViolation(msg),
            _ => Self::Db(e.to_string()),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(e: RepositoryError) -> Self { Self::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclassified_db_errors_stay_generic() {
        let e = RepositoryError::from(DbErr::Custom("boom".into()));
        assert!(matches!(e, RepositoryError::Db(ref m) if m.contains("boom")));
    }

    #[test]
    fn untranslated_repository_errors_surface_as_db() {
        let e: ServiceError = RepositoryError::ForeignKeyViolation("fk".into()).into();
        assert!(matches!(e, ServiceError::Db(_)));
    }
}
