use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use models::{role, user, user_role};

use crate::errors::RepositoryError;
use crate::pagination::{ordered, Page, PageRequest};
use crate::users::domain::{NewUser, RoleDto, UserChanges, UserRecord, UserSortKey};
use crate::users::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn sort_column(property: &str) -> Option<user::Column> {
    UserSortKey::from_property(property).map(|k| match k {
        UserSortKey::Id => user::Column::Id,
        UserSortKey::FirstName => user::Column::FirstName,
        UserSortKey::LastName => user::Column::LastName,
        UserSortKey::Email => user::Column::Email,
    })
}

/// Roles of every given user in one query, keyed by user id.
async fn load_roles<C: ConnectionTrait>(conn: &C, user_ids: &[i64]) -> Result<HashMap<i64, Vec<RoleDto>>, RepositoryError> {
    let mut by_user: HashMap<i64, Vec<RoleDto>> = HashMap::new();
    if user_ids.is_empty() {
        return Ok(by_user);
    }
    let rows = user_role::Entity::find()
        .filter(user_role::Column::UserId.is_in(user_ids.to_vec()))
        .find_also_related(role::Entity)
        .order_by_asc(user_role::Column::RoleId)
        .all(conn)
        .await?;
    for (pair, role) in rows {
        if let Some(role) = role {
            by_user.entry(pair.user_id).or_default().push(role.into());
        }
    }
    Ok(by_user)
}

/// Drop every pair of `user_id` and write the new set.
async fn replace_roles<C: ConnectionTrait>(conn: &C, user_id: i64, role_ids: &[i64]) -> Result<(), RepositoryError> {
    user_role::Entity::delete_many()
        .filter(user_role::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    let pairs = user_role::pairs_for(user_id, role_ids);
    if !pairs.is_empty() {
        user_role::Entity::insert_many(pairs).exec_without_returning(conn).await?;
    }
    Ok(())
}

fn record(u: user::Model, roles: Vec<RoleDto>) -> UserRecord {
    UserRecord {
        id: u.id,
        first_name: u.first_name,
        last_name: u.last_name,
        email: u.email,
        password_hash: u.password,
        roles,
    }
}

async fn fetch_record<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<UserRecord>, RepositoryError> {
    let Some(u) = user::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    let mut roles = load_roles(conn, &[id]).await?;
    Ok(Some(record(u, roles.remove(&id).unwrap_or_default())))
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all_paged(&self, page: &PageRequest) -> Result<Page<UserRecord>, RepositoryError> {
        let (idx, size) = page.normalize().map_err(|e| RepositoryError::Db(e.to_string()))?;
        let select = ordered(user::Entity::find(), page.sort.as_ref(), sort_column, user::Column::Id)
            .map_err(|e| RepositoryError::Db(e.to_string()))?;
        let txn = self.db.begin().await?;
        let paginator = select.paginate(&txn, size);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(idx).await?;

        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut roles = load_roles(&txn, &ids).await?;
        txn.commit().await?;
        let content = users
            .into_iter()
            .map(|u| {
                let r = roles.remove(&u.id).unwrap_or_default();
                record(u, r)
            })
            .collect();
        Ok(Page::new(content, total, idx, size))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError> {
        let txn = self.db.begin().await?;
        let found = fetch_record(&txn, id).await?;
        txn.commit().await?;
        Ok(found)
    }

    async fn insert(&self, new: NewUser) -> Result<UserRecord, RepositoryError> {
        let txn = self.db.begin().await?;
        let am = user::ActiveModel {
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            email: Set(new.email),
            password: Set(new.password_hash),
            ..Default::default()
        };
        let created = am.insert(&txn).await?;
        replace_roles(&txn, created.id, &new.role_ids).await?;
        let mut roles = load_roles(&txn, &[created.id]).await?;
        let id = created.id;
        txn.commit().await?;
        Ok(record(created, roles.remove(&id).unwrap_or_default()))
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<UserRecord, RepositoryError> {
        let txn = self.db.begin().await?;
        let res = user::Entity::update_many()
            .col_expr(user::Column::FirstName, Expr::value(changes.first_name))
            .col_expr(user::Column::LastName, Expr::value(changes.last_name))
            .col_expr(user::Column::Email, Expr::value(changes.email))
            .filter(user::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(RepositoryError::MissingEntity(format!("user {id}")));
        }
        replace_roles(&txn, id, &changes.role_ids).await?;
        let updated = fetch_record(&txn, id)
            .await?
            .ok_or_else(|| RepositoryError::MissingEntity(format!("user {id}")))?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
        let n = user::Entity::find().filter(user::Column::Id.eq(id)).count(&self.db).await?;
        Ok(n > 0)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        user::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}
