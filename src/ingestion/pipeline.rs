//! Periodic menu ingestion: fetch each canteen's payload, classify and
//! resolve every record to a meal identity, and atomically replace each
//! day's menu entries.
//!
//! Failure isolation: one canteen's fetch failure, or one day's bad
//! data, never aborts the rest of the run. Upstream trouble is a
//! warning; an unknown meal-type code means the provider changed its
//! format and is logged as an error for the operator.

use sea_orm::DatabaseConnection;
use std::time::Duration;

use crate::canteens::{self, Canteen, Course};
use crate::errors::{ApiError, Result};
use crate::ingestion::provider::{self, ProviderDay};
use crate::services::meal_service::MealService;
use crate::services::menu_service::{MenuService, NewEntry};

/// Runs ingestion forever on a fixed interval. Spawned from `main`;
/// independent of the request path.
pub async fn run_scheduled(db: DatabaseConnection, base_url: String, interval: Duration) {
    let client = match provider::client() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "could not build provider HTTP client, ingestion disabled");
            return;
        }
    };

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        run_once(&db, &client, &base_url).await;
    }
}

/// One full ingestion pass over all registered canteens.
pub async fn run_once(db: &DatabaseConnection, client: &reqwest::Client, base_url: &str) {
    for canteen in canteens::CANTEENS {
        match ingest_canteen(db, client, base_url, canteen).await {
            Ok(days) => {
                tracing::info!(canteen = canteen.name, days, "ingestion finished");
            }
            Err(e) => {
                tracing::warn!(canteen = canteen.name, error = %e, "ingestion failed, continuing with next canteen");
            }
        }
    }
}

/// Ingests one canteen: fetches its payload and replaces each day it
/// covers. Returns the number of days successfully written.
pub async fn ingest_canteen(
    db: &DatabaseConnection,
    client: &reqwest::Client,
    base_url: &str,
    canteen: &'static Canteen,
) -> Result<usize> {
    let days = provider::fetch_menu(client, base_url, canteen.number).await?;

    let mut written = 0;
    for day in &days {
        match ingest_day(db, canteen, day).await {
            Ok(_) => written += 1,
            Err(e @ (ApiError::UnknownMealType { .. } | ApiError::AmbiguousCanteen(_))) => {
                // Our model of the provider is stale; this needs an
                // operator, not a retry.
                tracing::error!(canteen = canteen.name, date = %day.date, error = %e, "integrity failure during ingestion");
            }
            Err(e) => {
                tracing::warn!(canteen = canteen.name, date = %day.date, error = %e, "skipped day");
            }
        }
    }
    Ok(written)
}

async fn ingest_day(
    db: &DatabaseConnection,
    canteen: &'static Canteen,
    day: &ProviderDay,
) -> Result<usize> {
    let date = provider::parse_provider_date(&day.date)?;

    let mut entries = Vec::new();
    for raw in &day.meals {
        if !canteen.meal_valid(raw) {
            continue;
        }

        let meal = MealService::resolve_or_create(db, canteen, &raw.name, &raw.meal_type).await?;

        // The course comes from the resolved identity, not today's code:
        // a known name keeps its original classification. For mains the
        // raw code doubles as the ordering number among the day's mains.
        let course_number = match Course::from_str(&meal.course) {
            Some(Course::Main) => {
                let number = raw.meal_type.trim().parse::<i32>().map_err(|_| {
                    ApiError::UnknownMealType {
                        canteen: canteen.name,
                        code: raw.meal_type.clone(),
                    }
                })?;
                Some(number)
            }
            Some(_) => None,
            None => {
                return Err(ApiError::Internal(format!(
                    "meal {} has unknown stored course {:?}",
                    meal.id, meal.course
                )));
            }
        };

        entries.push(NewEntry {
            meal_id: meal.id,
            course_number,
        });
    }

    MenuService::replace_day(db, canteen.number, date, entries).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::provider::ProviderMeal;
    use crate::models::{meals, menu_entries};
    use crate::services::test_utils::setup_test_db;
    use sea_orm::EntityTrait;

    fn day(date: &str, records: &[(&str, &str)]) -> ProviderDay {
        ProviderDay {
            date: date.to_string(),
            meals: records
                .iter()
                .map(|(name, code)| ProviderMeal {
                    name: name.to_string(),
                    meal_type: code.to_string(),
                })
                .collect(),
        }
    }

    fn ceskolipska() -> &'static Canteen {
        canteens::by_name("CESKOLIPSKA").unwrap()
    }

    #[tokio::test]
    async fn test_ingest_day_classifies_and_filters() {
        let db = setup_test_db().await.unwrap();
        let payload = day(
            "02.09.2025",
            &[
                ("Hovězí vývar", "P"),
                ("Svíčková na smetaně", "1"),
                ("Kuřecí řízek", "2"),
                ("Kompot", "D"),
                ("---", "1"), // placeholder row, filtered out
            ],
        );

        let written = ingest_day(&db, ceskolipska(), &payload).await.unwrap();
        assert_eq!(written, 4);

        // course == MAIN iff course_number is set.
        let entries = menu_entries::Entity::find().all(&db).await.unwrap();
        for entry in &entries {
            let meal = meals::Entity::find_by_id(entry.meal_id)
                .one(&db)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(meal.course == "MAIN", entry.course_number.is_some());
        }

        let mains: Vec<i32> = entries.iter().filter_map(|e| e.course_number).collect();
        assert_eq!(mains.len(), 2);
        assert!(mains.contains(&1) && mains.contains(&2));
    }

    #[tokio::test]
    async fn test_ingest_day_is_idempotent() {
        let db = setup_test_db().await.unwrap();
        let payload = day(
            "02.09.2025",
            &[("Hovězí vývar", "P"), ("Svíčková na smetaně", "1")],
        );

        ingest_day(&db, ceskolipska(), &payload).await.unwrap();
        let first: Vec<(i32, Option<i32>)> = menu_entries::Entity::find()
            .all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.meal_id, e.course_number))
            .collect();

        ingest_day(&db, ceskolipska(), &payload).await.unwrap();
        let second: Vec<(i32, Option<i32>)> = menu_entries::Entity::find()
            .all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.meal_id, e.course_number))
            .collect();

        assert_eq!(first, second);
        // And no meal duplication either.
        assert_eq!(meals::Entity::find().all(&db).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_code_fails_the_day() {
        let db = setup_test_db().await.unwrap();
        let payload = day("02.09.2025", &[("Záhadné jídlo", "??")]);

        let result = ingest_day(&db, ceskolipska(), &payload).await;
        assert!(matches!(result, Err(ApiError::UnknownMealType { .. })));
    }
}
