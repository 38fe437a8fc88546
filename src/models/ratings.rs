use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user's rating of one menu entry (a specific calendar serving,
/// not the meal globally). Unique per (menu_id, user_id); a resubmit
/// updates the row and refreshes rated_at instead of inserting.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ratings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub meal_id: i32,
    pub menu_id: i32,
    pub user_id: i32,
    /// 1..=10 inclusive, checked in RatingService.
    pub rating: i32,
    pub rated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meals::Entity",
        from = "Column::MealId",
        to = "super::meals::Column::Id"
    )]
    Meal,

    #[sea_orm(
        belongs_to = "super::menu_entries::Entity",
        from = "Column::MenuId",
        to = "super::menu_entries::Column::Id"
    )]
    MenuEntry,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::meals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl Related<super::menu_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuEntry.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
