use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use models::role;
use crate::errors::ServiceError;
use crate::users::RoleDto;

/// All roles ordered by id. Roles are seeded by migrations only.
pub async fn list_roles(db: &DatabaseConnection) -> Result<Vec<RoleDto>, ServiceError> {
    let roles = role::Entity::find().order_by_asc(role::Column::Id).all(db).await?;
    Ok(roles.into_iter().map(RoleDto::from).collect())
}

pub async fn get_role(db: &DatabaseConnection, id: i64) -> Result<RoleDto, ServiceError> {
    role::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(RoleDto::from)
        .ok_or_else(|| ServiceError::not_found("role"))
}
