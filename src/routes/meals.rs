use actix_web::{HttpResponse, get, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::Result;
use crate::middleware::AuthUser;
use crate::models::dto::{MealResponse, envelope};
use crate::services::meal_service::MealService;

/// GET /meals/{uuid} - meal identity by public UUID (PROTECTED)
#[get("/{uuid}")]
pub async fn get_meal(
    _auth_user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    let meal = MealService::find_by_uuid(db.get_ref(), path.into_inner()).await?;
    let name = MealService::name_of(db.get_ref(), meal.id).await?;

    Ok(envelope(
        "/api/meals",
        MealResponse {
            uuid: meal.uuid,
            name,
            course: meal.course,
            description: meal.description,
        },
    ))
}

pub fn meals_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(web::scope("/meals").service(get_meal));
}
