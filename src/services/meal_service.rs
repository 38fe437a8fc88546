use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::collections::HashMap;
use uuid::Uuid;

use crate::canteens::Canteen;
use crate::errors::{ApiError, Result};
use crate::models::{meal_names, meals};

pub struct MealService;

impl MealService {
    /// Resolves an external meal name to its stable identity, creating a
    /// fresh meal on first sighting.
    ///
    /// Dedup key is the exact name: a known name returns the existing
    /// meal without consulting the type code at all. Only a brand-new
    /// name gets classified (and an unknown code is surfaced as an
    /// integrity error, not skipped). A concurrent first-sighting race on
    /// the same name is caught by the unique index on meal_names.name;
    /// ingestion runs serially so it does not happen in practice.
    pub async fn resolve_or_create(
        db: &DatabaseConnection,
        canteen: &Canteen,
        raw_name: &str,
        raw_type_code: &str,
    ) -> Result<meals::Model> {
        let existing = meal_names::Entity::find()
            .filter(meal_names::Column::Name.eq(raw_name))
            .one(db)
            .await?;

        if let Some(name_row) = existing {
            return meals::Entity::find_by_id(name_row.meal_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ApiError::Internal(format!(
                        "meal name row {} points at missing meal {}",
                        name_row.id, name_row.meal_id
                    ))
                });
        }

        let course = canteen.translate_course(raw_type_code)?;

        let meal = meals::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            course: Set(course.as_str().to_string()),
            description: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        meal_names::ActiveModel {
            meal_id: Set(meal.id),
            name: Set(raw_name.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::debug!(meal_id = meal.id, name = raw_name, course = %meal.course, "created meal");
        Ok(meal)
    }

    /// Public-facing lookup by the meal's stable UUID.
    pub async fn find_by_uuid(db: &DatabaseConnection, uuid: Uuid) -> Result<meals::Model> {
        meals::Entity::find()
            .filter(meals::Column::Uuid.eq(uuid))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("meal"))
    }

    /// Canonical display name for a meal, if one was recorded.
    pub async fn name_of(db: &DatabaseConnection, meal_id: i32) -> Result<Option<String>> {
        Ok(meal_names::Entity::find()
            .filter(meal_names::Column::MealId.eq(meal_id))
            .one(db)
            .await?
            .map(|row| row.name))
    }

    /// Display names for a whole set of meals in one query. Used by the
    /// menu read path so a day's entries cost one lookup, not one per
    /// entry.
    pub async fn names_for(
        db: &DatabaseConnection,
        meal_ids: Vec<i32>,
    ) -> Result<HashMap<i32, String>> {
        if meal_ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(meal_names::Entity::find()
            .filter(meal_names::Column::MealId.is_in(meal_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.meal_id, row.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canteens;
    use crate::services::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_resolve_or_create_dedups_by_name() {
        let db = setup_test_db().await.unwrap();
        let canteen = canteens::by_name("CESKOLIPSKA").unwrap();

        let first = MealService::resolve_or_create(&db, canteen, "Svíčková", "1")
            .await
            .unwrap();
        // Second sighting with a different type code still resolves to
        // the same identity; the code is ignored for known names.
        let second = MealService::resolve_or_create(&db, canteen, "Svíčková", "P")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.uuid, second.uuid);
        assert_eq!(second.course, "MAIN");
    }

    #[tokio::test]
    async fn test_unknown_type_code_is_an_integrity_error() {
        let db = setup_test_db().await.unwrap();
        let canteen = canteens::by_name("CESKOLIPSKA").unwrap();

        let result = MealService::resolve_or_create(&db, canteen, "Záhada", "??").await;
        assert!(matches!(result, Err(ApiError::UnknownMealType { .. })));
    }

    #[tokio::test]
    async fn test_find_by_uuid() {
        let db = setup_test_db().await.unwrap();
        let canteen = canteens::by_name("CESKOLIPSKA").unwrap();

        let meal = MealService::resolve_or_create(&db, canteen, "Guláš", "2")
            .await
            .unwrap();

        let found = MealService::find_by_uuid(&db, meal.uuid).await.unwrap();
        assert_eq!(found.id, meal.id);
        assert_eq!(
            MealService::name_of(&db, meal.id).await.unwrap().as_deref(),
            Some("Guláš")
        );

        let missing = MealService::find_by_uuid(&db, Uuid::new_v4()).await;
        assert!(matches!(missing, Err(ApiError::NotFound("meal"))));
    }

    #[tokio::test]
    async fn test_names_for_batches_lookups() {
        let db = setup_test_db().await.unwrap();
        let canteen = canteens::by_name("CESKOLIPSKA").unwrap();

        let soup = MealService::resolve_or_create(&db, canteen, "Vývar", "P").await.unwrap();
        let main = MealService::resolve_or_create(&db, canteen, "Guláš", "1").await.unwrap();

        let names = MealService::names_for(&db, vec![soup.id, main.id]).await.unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[&soup.id], "Vývar");
        assert_eq!(names[&main.id], "Guláš");

        assert!(MealService::names_for(&db, vec![]).await.unwrap().is_empty());
    }
}
