use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{category, errors::ModelError};
use crate::errors::{RepositoryError, ServiceError};
use crate::pagination::{ordered, Page, PageRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<(), ModelError> { category::validate_name(&self.name) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: i64,
    pub name: String,
}

impl From<category::Model> for CategoryDto {
    fn from(m: category::Model) -> Self { Self { id: m.id, name: m.name } }
}

fn sort_column(property: &str) -> Option<category::Column> {
    match property {
        "id" => Some(category::Column::Id),
        "name" => Some(category::Column::Name),
        _ => None,
    }
}

pub async fn list_categories(db: &DatabaseConnection, page: PageRequest) -> Result<Page<CategoryDto>, ServiceError> {
    let (idx, size) = page.normalize()?;
    let select = ordered(category::Entity::find(), page.sort.as_ref(), sort_column, category::Column::Id)?;
    let txn = db.begin().await?;
    let paginator = select.paginate(&txn, size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(idx).await?;
    txn.commit().await?;
    Ok(Page::new(items.into_iter().map(CategoryDto::from).collect(), total, idx, size))
}

pub async fn get_category(db: &DatabaseConnection, id: i64) -> Result<CategoryDto, ServiceError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(CategoryDto::from)
        .ok_or_else(|| ServiceError::not_found("category"))
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_category(db: &DatabaseConnection, input: CategoryInput) -> Result<CategoryDto, ServiceError> {
    let now = Utc::now();
    let am = category::ActiveModel {
        name: Set(input.name),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };
    let created = am.insert(db).await?;
    info!(category_id = created.id, "category_created");
    Ok(created.into())
}

/// Rename a category; `NotFound` when the write touches no row.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn update_category(db: &DatabaseConnection, id: i64, input: CategoryInput) -> Result<CategoryDto, ServiceError> {
    let txn = db.begin().await?;
    let res = category::Entity::update_many()
        .col_expr(category::Column::Name, Expr::value(input.name))
        .col_expr(category::Column::UpdatedAt, Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())))
        .filter(category::Column::Id.eq(id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!("Id not found {id}")));
    }
    let updated = category::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Id not found {id}")))?;
    txn.commit().await?;
    info!(category_id = id, "category_updated");
    Ok(updated.into())
}

/// Remove a category nobody references. Products still pointing at it make
/// this a `DatabaseConflict`.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, id: i64) -> Result<(), ServiceError> {
    let exists = category::Entity::find().filter(category::Column::Id.eq(id)).count(db).await? > 0;
    if !exists {
        return Err(ServiceError::NotFound(format!("Id not found {id}")));
    }
    category::Entity::delete_by_id(id).exec(db).await.map_err(|e| match RepositoryError::from(e) {
        RepositoryError::ForeignKeyViolation(_) => ServiceError::referential_integrity(),
        other => other.into(),
    })?;
    info!(category_id = id, "category_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Sort;
    use crate::test_support::get_db;

    fn named(name: &str) -> CategoryInput { CategoryInput { name: name.into() } }

    #[tokio::test]
    async fn category_crud() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let books = create_category(&db, named("Books")).await?;
        assert_eq!(get_category(&db, books.id).await?.name, "Books");

        let renamed = update_category(&db, books.id, named("Livros")).await?;
        assert_eq!(renamed, CategoryDto { id: books.id, name: "Livros".into() });

        delete_category(&db, books.id).await?;
        assert!(matches!(get_category(&db, books.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        assert!(matches!(update_category(&db, 77, named("X")).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_category(&db, 77).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_sorted_and_paged() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        for name in ["Electronics", "Books", "Computers"] {
            create_category(&db, named(name)).await?;
        }
        let page = list_categories(&db, PageRequest::new(0, 2).with_sort(Sort::asc("name"))).await?;
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        let names: Vec<_> = page.content.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Computers"]);

        let bad = list_categories(&db, PageRequest::default().with_sort(Sort::asc("color"))).await;
        assert!(matches!(bad, Err(ServiceError::Validation(_))));

        let far = list_categories(&db, PageRequest::new(u64::MAX / 10 + 1, 10)).await;
        assert!(matches!(far, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(named(" ").validate().is_err());
        assert!(named("Books").validate().is_ok());
    }
}
