use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{ApiError, Result};
use crate::models::{meals, menu_entries, ratings};

pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 10;

/// Whose ratings a range query aggregates: the requesting user's own, or
/// everyone else's ("the crowd").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cohort {
    Own,
    Others,
}

impl Cohort {
    pub fn parse(value: &str) -> Result<Cohort> {
        match value.to_ascii_lowercase().as_str() {
            "self" => Ok(Cohort::Own),
            "others" => Ok(Cohort::Others),
            _ => Err(ApiError::Validation(format!(
                "cohort must be 'self' or 'others', got {:?}",
                value
            ))),
        }
    }
}

pub struct RatingService;

impl RatingService {
    /// Records a user's rating of one menu entry, upserting on
    /// (menu_id, user_id): a resubmit replaces the value and refreshes
    /// the timestamp instead of adding a second row.
    pub async fn rate(
        db: &DatabaseConnection,
        user_id: i32,
        menu_entry_uuid: Uuid,
        value: i32,
    ) -> Result<ratings::Model> {
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(ApiError::RatingOutOfRange(value));
        }

        let entry = menu_entries::Entity::find()
            .filter(menu_entries::Column::Uuid.eq(menu_entry_uuid))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("menu entry"))?;

        // Insert-or-update against the unique (menu_id, user_id) index,
        // so two concurrent submissions from the same user serialize in
        // the database instead of both passing a find-then-insert check.
        let now = Utc::now().naive_utc();
        ratings::Entity::insert(ratings::ActiveModel {
            meal_id: Set(entry.meal_id),
            menu_id: Set(entry.id),
            user_id: Set(user_id),
            rating: Set(value),
            rated_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([ratings::Column::MenuId, ratings::Column::UserId])
                .update_columns([ratings::Column::Rating, ratings::Column::RatedAt])
                .to_owned(),
        )
        .exec(db)
        .await?;

        ratings::Entity::find()
            .filter(ratings::Column::MenuId.eq(entry.id))
            .filter(ratings::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!(
                    "rating for menu entry {} by user {} vanished after upsert",
                    entry.id, user_id
                ))
            })
    }

    /// Average rating this user gave, grouped by meal identity (a
    /// recurring meal's ratings across servings aggregate together).
    /// Keyed by the meal's public UUID.
    pub async fn ratings_for_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<HashMap<Uuid, f64>> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .all(db)
            .await?;

        let meal_ids: Vec<i32> = rows.iter().map(|r| r.meal_id).collect();
        let uuid_by_meal: HashMap<i32, Uuid> = meals::Entity::find()
            .filter(meals::Column::Id.is_in(meal_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.uuid))
            .collect();

        let mut sums: HashMap<i32, (i64, i64)> = HashMap::new();
        for row in &rows {
            let slot = sums.entry(row.meal_id).or_insert((0, 0));
            slot.0 += i64::from(row.rating);
            slot.1 += 1;
        }

        Ok(sums
            .into_iter()
            .filter_map(|(meal_id, (sum, count))| {
                uuid_by_meal
                    .get(&meal_id)
                    .map(|uuid| (*uuid, sum as f64 / count as f64))
            })
            .collect())
    }

    /// Per-meal average over all menu entries falling in the inclusive
    /// date range, restricted to the user's own ratings or to everyone
    /// else's. Keyed by meal id.
    pub async fn ratings_in_range(
        db: &DatabaseConnection,
        from: NaiveDate,
        to: NaiveDate,
        cohort: Cohort,
        user_id: i32,
    ) -> Result<HashMap<i32, f64>> {
        if from > to {
            return Err(ApiError::InvalidDateRange);
        }

        let entries = menu_entries::Entity::find()
            .filter(menu_entries::Column::Date.gte(from))
            .filter(menu_entries::Column::Date.lte(to))
            .all(db)
            .await?;
        let menu_ids: Vec<i32> = entries.iter().map(|e| e.id).collect();
        if menu_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = ratings::Entity::find().filter(ratings::Column::MenuId.is_in(menu_ids));
        query = match cohort {
            Cohort::Own => query.filter(ratings::Column::UserId.eq(user_id)),
            Cohort::Others => query.filter(ratings::Column::UserId.ne(user_id)),
        };
        let rows = query.all(db).await?;

        let mut sums: HashMap<i32, (i64, i64)> = HashMap::new();
        for row in &rows {
            let slot = sums.entry(row.meal_id).or_insert((0, 0));
            slot.0 += i64::from(row.rating);
            slot.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(meal_id, (sum, count))| (meal_id, sum as f64 / count as f64))
            .collect())
    }
}
