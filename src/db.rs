// Database connection + schema creation.

use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use std::env;

use crate::models::{
    meal_names, meals, menu_entries, photos, ratings, registrations, sessions, users,
    verifications,
};

pub async fn establish_connection() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in .env file");

    Database::connect(&database_url).await
}

/// Creates all tables from the entity definitions (no-op for tables
/// that already exist). Also used by tests against sqlite::memory:.
pub async fn create_tables(db: &DatabaseConnection) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    macro_rules! create {
        ($entity:expr) => {{
            let mut stmt = schema.create_table_from_entity($entity);
            stmt.if_not_exists();
            db.execute(builder.build(&stmt)).await?;
        }};
    }

    create!(meals::Entity);
    create!(meal_names::Entity);
    create!(menu_entries::Entity);
    create!(users::Entity);
    create!(registrations::Entity);
    create!(sessions::Entity);
    create!(verifications::Entity);
    create!(ratings::Entity);
    create!(photos::Entity);

    // One rating per user per menu entry. RatingService::rate upserts
    // against this index, so concurrent double-submits collapse into a
    // single row instead of racing find-then-insert.
    let ratings_unique = Index::create()
        .name("idx_ratings_menu_user")
        .table(ratings::Entity)
        .col(ratings::Column::MenuId)
        .col(ratings::Column::UserId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&ratings_unique)).await?;

    Ok(())
}
