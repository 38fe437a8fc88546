use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::errors::{ApiError, Result};
use crate::models::photos;
use crate::services::meal_service::MealService;

pub struct PhotoService;

impl PhotoService {
    /// Stores an uploaded photo: bytes on disk under the configured
    /// directory (named by a fresh UUID), metadata row in the database.
    /// Rows are immutable once created; a meal can collect any number of
    /// photos from different users.
    pub async fn store(
        db: &DatabaseConnection,
        photo_dir: &Path,
        user_id: i32,
        meal_uuid: Uuid,
        bytes: &[u8],
    ) -> Result<photos::Model> {
        if bytes.is_empty() {
            return Err(ApiError::Validation("photo body is empty".to_string()));
        }
        let meal = MealService::find_by_uuid(db, meal_uuid).await?;

        let photo_uuid = Uuid::new_v4();
        let file_name = format!("{}.jpg", photo_uuid);
        tokio::fs::create_dir_all(photo_dir).await?;
        tokio::fs::write(photo_dir.join(&file_name), bytes).await?;

        let photo = photos::ActiveModel {
            uuid: Set(photo_uuid),
            meal_id: Set(meal.id),
            user_id: Set(user_id),
            file_name: Set(file_name),
            uploaded: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(photo_id = photo.id, meal_id = meal.id, user_id, "photo stored");
        Ok(photo)
    }

    /// Looks up a photo row and the path its bytes live at.
    pub async fn fetch(
        db: &DatabaseConnection,
        photo_dir: &Path,
        uuid: Uuid,
    ) -> Result<(photos::Model, PathBuf)> {
        let photo = photos::Entity::find()
            .filter(photos::Column::Uuid.eq(uuid))
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("photo"))?;

        let path = photo_dir.join(&photo.file_name);
        Ok((photo, path))
    }
}
