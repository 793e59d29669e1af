//! Seed the fixed role catalogue. Roles are looked up by the services and
//! never created through the API.
use sea_orm_migration::prelude::*;

pub const SEEDED_AUTHORITIES: [&str; 2] = ["ROLE_OPERATOR", "ROLE_ADMIN"];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(Role::Table).columns([Role::Authority]);
        for authority in SEEDED_AUTHORITIES {
            insert.values_panic([authority.into()]);
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Role::Table)
            .and_where(Expr::col(Role::Authority).is_in(SEEDED_AUTHORITIES))
            .to_owned();
        manager.exec_stmt(delete).await
    }
}

#[derive(DeriveIden)]
enum Role {
    #[sea_orm(iden = "tb_role")]
    Table,
    Authority,
}
