//! Schema-level checks against a throwaway SQLite database.

use anyhow::Result;
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set, SqlErr};
use uuid::Uuid;

use crate::db::{connect_with_config, DatabaseConfig};
use crate::{category, product, product_category, role, user, user_role};

async fn setup_test_db() -> Result<DatabaseConnection> {
    let path = std::env::temp_dir().join(format!("dscatalog_models_{}.db", Uuid::new_v4()));
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

async fn insert_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    let am = user::ActiveModel {
        first_name: Set("Ana".into()),
        last_name: Set("Silva".into()),
        email: Set(email.into()),
        password: Set("hash".into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

#[tokio::test]
async fn roles_are_seeded() -> Result<()> {
    let db = setup_test_db().await?;
    let roles = role::Entity::find().order_by_asc(role::Column::Id).all(&db).await?;
    let names: Vec<_> = roles.iter().map(|r| r.authority.as_str()).collect();
    assert_eq!(names, vec!["ROLE_OPERATOR", "ROLE_ADMIN"]);
    Ok(())
}

#[tokio::test]
async fn user_roles_resolve_through_association() -> Result<()> {
    let db = setup_test_db().await?;
    let u = insert_user(&db, "ana@x.com").await?;
    user_role::Entity::insert_many(user_role::pairs_for(u.id, &[1, 2, 1]))
        .exec_without_returning(&db)
        .await?;

    let roles = u.find_related(role::Entity).order_by_asc(role::Column::Id).all(&db).await?;
    assert_eq!(roles.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn unknown_role_is_a_foreign_key_violation() -> Result<()> {
    let db = setup_test_db().await?;
    let u = insert_user(&db, "bea@x.com").await?;
    let err = user_role::Entity::insert_many(user_role::pairs_for(u.id, &[999]))
        .exec_without_returning(&db)
        .await
        .unwrap_err();
    assert!(matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))));
    Ok(())
}

#[tokio::test]
async fn deleting_user_drops_its_role_pairs() -> Result<()> {
    let db = setup_test_db().await?;
    let u = insert_user(&db, "cid@x.com").await?;
    user_role::Entity::insert_many(user_role::pairs_for(u.id, &[1]))
        .exec_without_returning(&db)
        .await?;

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    let left = user_role::Entity::find().filter(user_role::Column::UserId.eq(u.id)).all(&db).await?;
    assert!(left.is_empty());
    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_a_unique_violation() -> Result<()> {
    let db = setup_test_db().await?;
    insert_user(&db, "dup@x.com").await?;
    let err = insert_user(&db, "dup@x.com").await.unwrap_err();
    let db_err = err.downcast::<sea_orm::DbErr>()?;
    assert!(matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))));
    Ok(())
}

#[tokio::test]
async fn category_in_use_cannot_be_deleted() -> Result<()> {
    let db = setup_test_db().await?;
    let now = Utc::now().fixed_offset();
    let c = category::ActiveModel {
        name: Set("Books".into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    let p = product::ActiveModel {
        name: Set("The Lord of the Rings".into()),
        description: Set("Lorem ipsum".into()),
        price: Set(90.5),
        img_url: Set("https://img.example/1.jpg".into()),
        date: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&db)
    .await?;
    product_category::Entity::insert_many(product_category::pairs_for(p.id, &[c.id]))
        .exec_without_returning(&db)
        .await?;

    let err = category::Entity::delete_by_id(c.id).exec(&db).await.unwrap_err();
    assert!(matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))));
    assert!(category::Entity::find_by_id(c.id).one(&db).await?.is_some());

    // the product side cascades
    product::Entity::delete_by_id(p.id).exec(&db).await?;
    category::Entity::delete_by_id(c.id).exec(&db).await?;
    Ok(())
}
