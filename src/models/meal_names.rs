use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// External display name of a meal. The exact name is the dedup key for
/// ingestion: the unique index backs up the application-level
/// lookup-then-create in MealService.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meal_names")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub meal_id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meals::Entity",
        from = "Column::MealId",
        to = "super::meals::Column::Id"
    )]
    Meal,
}

impl Related<super::meals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
