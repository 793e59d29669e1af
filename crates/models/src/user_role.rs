//! Explicit `(user_id, role_id)` association rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{role, user};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tb_user_role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Role,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
            Relation::Role => Entity::belongs_to(role::Entity).from(Column::RoleId).to(role::Column::Id).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef { Relation::Role.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Association rows for one user, duplicates collapsed, in first-seen order.
pub fn pairs_for(user_id: i64, role_ids: &[i64]) -> Vec<ActiveModel> {
    let mut seen = std::collections::HashSet::new();
    role_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|role_id| ActiveModel {
            user_id: sea_orm::Set(user_id),
            role_id: sea_orm::Set(*role_id),
        })
        .collect()
}
