use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A distinct dish. Created once per never-before-seen meal name during
/// ingestion; id and UUID never change afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    /// "SOUP" | "MAIN" | "ADDITION", see crate::canteens::Course.
    pub course: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::meal_names::Entity")]
    MealName,

    #[sea_orm(has_many = "super::menu_entries::Entity")]
    MenuEntry,

    #[sea_orm(has_many = "super::ratings::Entity")]
    Rating,

    #[sea_orm(has_many = "super::photos::Entity")]
    Photo,
}

impl Related<super::meal_names::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MealName.def()
    }
}

impl Related<super::menu_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
