use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{category, product};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tb_product_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub category_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
    Category,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity).from(Column::ProductId).to(product::Column::Id).into(),
            Relation::Category => Entity::belongs_to(category::Entity).from(Column::CategoryId).to(category::Column::Id).into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef { Relation::Category.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Association rows for one product, duplicates collapsed.
pub fn pairs_for(product_id: i64, category_ids: &[i64]) -> Vec<ActiveModel> {
    let mut seen = std::collections::HashSet::new();
    category_ids
        .iter()
        .filter(|id| seen.insert(**id))
        .map(|category_id| ActiveModel {
            product_id: sea_orm::Set(product_id),
            category_id: sea_orm::Set(*category_id),
        })
        .collect()
}
