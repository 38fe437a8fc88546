use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One appearance of a meal on a calendar date at a canteen.
///
/// The whole (canteen, date) set is replaced in one transaction on each
/// ingestion run. `course_number` is non-null iff the meal's course is
/// MAIN; it orders concurrent mains within a day.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub meal_id: i32,
    /// Provider-assigned canteen number, see crate::canteens::CANTEENS.
    pub canteen_number: String,
    pub date: Date,
    pub course_number: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meals::Entity",
        from = "Column::MealId",
        to = "super::meals::Column::Id"
    )]
    Meal,

    #[sea_orm(has_many = "super::ratings::Entity")]
    Rating,
}

impl Related<super::meals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meal.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
