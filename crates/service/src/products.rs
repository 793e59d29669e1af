use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{category, errors::ModelError, product, product_category};
use crate::categories::CategoryDto;
use crate::errors::{RepositoryError, ServiceError};
use crate::pagination::{ordered, Page, PageRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub img_url: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), ModelError> {
        product::validate_name(&self.name)?;
        product::validate_price(self.price)?;
        if self.date > Utc::now() {
            return Err(ModelError::Validation("date cannot be in the future".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTime<Utc>,
    pub categories: Vec<CategoryDto>,
}

impl ProductDto {
    fn from_model(m: product::Model, categories: Vec<CategoryDto>) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            img_url: m.img_url,
            date: m.date.with_timezone(&Utc),
            categories,
        }
    }

    pub fn category_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.categories.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids
    }
}

fn sort_column(property: &str) -> Option<product::Column> {
    match property {
        "id" => Some(product::Column::Id),
        "name" => Some(product::Column::Name),
        "price" => Some(product::Column::Price),
        "date" => Some(product::Column::Date),
        _ => None,
    }
}

fn write_error(e: sea_orm::DbErr) -> ServiceError {
    match RepositoryError::from(e) {
        RepositoryError::ForeignKeyViolation(_) => ServiceError::not_found("category"),
        other => other.into(),
    }
}

async fn load_categories<C: ConnectionTrait>(conn: &C, product_ids: &[i64]) -> Result<HashMap<i64, Vec<CategoryDto>>, ServiceError> {
    let mut by_product: HashMap<i64, Vec<CategoryDto>> = HashMap::new();
    if product_ids.is_empty() {
        return Ok(by_product);
    }
    let rows = product_category::Entity::find()
        .filter(product_category::Column::ProductId.is_in(product_ids.to_vec()))
        .find_also_related(category::Entity)
        .order_by_asc(product_category::Column::CategoryId)
        .all(conn)
        .await?;
    for (pair, cat) in rows {
        if let Some(cat) = cat {
            by_product.entry(pair.product_id).or_default().push(cat.into());
        }
    }
    Ok(by_product)
}

async fn replace_categories<C: ConnectionTrait>(conn: &C, product_id: i64, category_ids: &[i64]) -> Result<(), ServiceError> {
    product_category::Entity::delete_many()
        .filter(product_category::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    let pairs = product_category::pairs_for(product_id, category_ids);
    if !pairs.is_empty() {
        product_category::Entity::insert_many(pairs)
            .exec_without_returning(conn)
            .await
            .map_err(write_error)?;
    }
    Ok(())
}

async fn fetch<C: ConnectionTrait>(conn: &C, id: i64) -> Result<Option<ProductDto>, ServiceError> {
    let Some(p) = product::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    let mut cats = load_categories(conn, &[id]).await?;
    Ok(Some(ProductDto::from_model(p, cats.remove(&id).unwrap_or_default())))
}

pub async fn list_products(db: &DatabaseConnection, page: PageRequest) -> Result<Page<ProductDto>, ServiceError> {
    let (idx, size) = page.normalize()?;
    let select = ordered(product::Entity::find(), page.sort.as_ref(), sort_column, product::Column::Id)?;
    let txn = db.begin().await?;
    let paginator = select.paginate(&txn, size);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(idx).await?;
    let ids: Vec<i64> = items.iter().map(|p| p.id).collect();
    let mut cats = load_categories(&txn, &ids).await?;
    txn.commit().await?;

    let content = items
        .into_iter()
        .map(|p| {
            let c = cats.remove(&p.id).unwrap_or_default();
            ProductDto::from_model(p, c)
        })
        .collect();
    Ok(Page::new(content, total, idx, size))
}

pub async fn get_product(db: &DatabaseConnection, id: i64) -> Result<ProductDto, ServiceError> {
    fetch(db, id).await?.ok_or_else(|| ServiceError::not_found("product"))
}

/// Store a product and attach its categories in one transaction. An unknown
/// category id rolls the whole write back.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_product(db: &DatabaseConnection, input: ProductInput) -> Result<ProductDto, ServiceError> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let txn = db.begin().await?;
    let am = product::ActiveModel {
        name: Set(input.name),
        description: Set(input.description),
        price: Set(input.price),
        img_url: Set(input.img_url),
        date: Set(input.date.into()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = am.insert(&txn).await?;
    replace_categories(&txn, created.id, &input.category_ids).await?;
    let dto = fetch(&txn, created.id).await?.ok_or_else(|| ServiceError::not_found("product"))?;
    txn.commit().await?;
    info!(product_id = dto.id, categories = dto.categories.len(), "product_created");
    Ok(dto)
}

/// Overwrite every field and the category set.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn update_product(db: &DatabaseConnection, id: i64, input: ProductInput) -> Result<ProductDto, ServiceError> {
    let txn = db.begin().await?;
    let res = product::Entity::update_many()
        .col_expr(product::Column::Name, Expr::value(input.name))
        .col_expr(product::Column::Description, Expr::value(input.description))
        .col_expr(product::Column::Price, Expr::value(input.price))
        .col_expr(product::Column::ImgUrl, Expr::value(input.img_url))
        .col_expr(product::Column::Date, Expr::value(DateTimeWithTimeZone::from(input.date)))
        .col_expr(product::Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())))
        .filter(product::Column::Id.eq(id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!("Id not found {id}")));
    }
    replace_categories(&txn, id, &input.category_ids).await?;
    let dto = fetch(&txn, id).await?.ok_or_else(|| ServiceError::NotFound(format!("Id not found {id}")))?;
    txn.commit().await?;
    info!(product_id = id, categories = dto.categories.len(), "product_updated");
    Ok(dto)
}

#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, id: i64) -> Result<(), ServiceError> {
    let exists = product::Entity::find().filter(product::Column::Id.eq(id)).count(db).await? > 0;
    if !exists {
        return Err(ServiceError::NotFound(format!("Id not found {id}")));
    }
    product::Entity::delete_by_id(id).exec(db).await.map_err(|e| match RepositoryError::from(e) {
        RepositoryError::ForeignKeyViolation(_) => ServiceError::referential_integrity(),
        other => other.into(),
    })?;
    info!(product_id = id, "product_deleted");
    Ok(())
}
