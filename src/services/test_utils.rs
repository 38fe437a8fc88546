//! Shared helpers for service tests: an in-memory SQLite database with
//! all tables created, plus factories for the entities most tests need.

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};

use crate::canteens;
use crate::models::{meals, users};
use crate::services::meal_service::MealService;
use crate::utils::{password, tokens};

/// Standard test database setup.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::db::create_tables(&db).await?;
    Ok(db)
}

/// Creates a meal through the real resolve-or-create path.
pub async fn create_test_meal(db: &DatabaseConnection, name: &str, type_code: &str) -> meals::Model {
    let canteen = canteens::by_name("CESKOLIPSKA").unwrap();
    MealService::resolve_or_create(db, canteen, name, type_code)
        .await
        .unwrap()
}

/// Inserts a verified user directly (password "pw12345").
pub async fn create_test_user(db: &DatabaseConnection, email: &str, name: &str) -> users::Model {
    let salt = tokens::random_salt();
    let hash = password::hash_password("pw12345", &salt).unwrap();
    users::ActiveModel {
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        verified: Set(true),
        registered: Set(chrono::Utc::now().naive_utc()),
        password_hash: Set(hash),
        password_salt: Set(salt),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
