use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::{category, product_category};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tb_product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price: f64,
    pub img_url: String,
    pub date: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ProductCategory,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::ProductCategory => Entity::has_many(product_category::Entity).into() }
    }
}

impl Related<product_category::Entity> for Entity {
    fn to() -> RelationDef { Relation::ProductCategory.def() }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { product_category::Relation::Category.def() }
    fn via() -> Option<RelationDef> { Some(product_category::Relation::Product.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    if name.chars().count() > 255 { return Err(errors::ModelError::Validation("name too long (<=255)".into())); }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}
