use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::errors::{ApiError, Result};
use crate::models::{meals, menu_entries};

/// One entry of a freshly computed day menu, ready for insertion.
/// `course_number` is Some iff the meal's course is MAIN.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub meal_id: i32,
    pub course_number: Option<i32>,
}

pub struct MenuService;

impl MenuService {
    /// Replaces the whole (canteen, date) entry set in one transaction.
    ///
    /// Readers never observe a partial day, and re-running ingestion for
    /// an already-ingested date reproduces the same set instead of
    /// accumulating duplicates.
    pub async fn replace_day(
        db: &DatabaseConnection,
        canteen_number: &str,
        date: NaiveDate,
        entries: Vec<NewEntry>,
    ) -> Result<usize> {
        let txn = db.begin().await?;

        menu_entries::Entity::delete_many()
            .filter(menu_entries::Column::CanteenNumber.eq(canteen_number))
            .filter(menu_entries::Column::Date.eq(date))
            .exec(&txn)
            .await?;

        let count = entries.len();
        for entry in entries {
            menu_entries::ActiveModel {
                uuid: Set(Uuid::new_v4()),
                meal_id: Set(entry.meal_id),
                canteen_number: Set(canteen_number.to_string()),
                date: Set(date),
                course_number: Set(entry.course_number),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        tracing::info!(canteen = canteen_number, %date, entries = count, "replaced day menu");
        Ok(count)
    }

    /// Entries (joined with their meals) in the inclusive date range.
    pub async fn entries_between(
        db: &DatabaseConnection,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(menu_entries::Model, Option<meals::Model>)>> {
        if from > to {
            return Err(ApiError::InvalidDateRange);
        }

        menu_entries::Entity::find()
            .filter(menu_entries::Column::Date.gte(from))
            .filter(menu_entries::Column::Date.lte(to))
            .order_by_asc(menu_entries::Column::Date)
            .order_by_asc(menu_entries::Column::CourseNumber)
            .find_also_related(meals::Entity)
            .all(db)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_uuid(db: &DatabaseConnection, uuid: Uuid) -> Result<menu_entries::Model> {
        menu_entries::Entity::find()
            .filter(menu_entries::Column::Uuid.eq(uuid))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("menu entry"))
    }
}
