use actix_web::{HttpResponse, get, post, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::middleware::AuthUser;
use crate::models::dto::{PhotoResponse, envelope_created};
use crate::services::photo_service::PhotoService;

/// POST /photos/{meal_uuid} - upload a photo for a meal, raw image
/// bytes as the request body (PROTECTED)
#[post("/{meal_uuid}")]
pub async fn upload_photo(
    auth_user: AuthUser,
    path: web::Path<Uuid>,
    body: web::Bytes,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse> {
    let meal_uuid = path.into_inner();
    let photo = PhotoService::store(
        db.get_ref(),
        &config.photo_dir,
        auth_user.user_id,
        meal_uuid,
        &body,
    )
    .await?;

    Ok(envelope_created(
        "/api/photos",
        PhotoResponse {
            uuid: photo.uuid,
            meal_uuid,
            uploaded: photo.uploaded,
        },
    ))
}

/// GET /photos/{uuid} - the stored image bytes (PROTECTED)
#[get("/{uuid}")]
pub async fn get_photo(
    _auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse> {
    let (photo, file_path) =
        PhotoService::fetch(db.get_ref(), &config.photo_dir, path.into_inner()).await?;
    let bytes = tokio::fs::read(&file_path).await.map_err(|e| {
        tracing::error!(photo_id = photo.id, path = %file_path.display(), error = %e, "photo file missing");
        crate::errors::ApiError::NotFound("photo")
    })?;

    Ok(HttpResponse::Ok().content_type("image/jpeg").body(bytes))
}

pub fn photos_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(web::scope("/photos").service(get_photo).service(upload_photo));
}
