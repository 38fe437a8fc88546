use actix_web::{HttpResponse, get, web};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::errors::{ApiError, Result};
use crate::middleware::AuthUser;
use crate::models::dto::{MealResponse, MenuEntryResponse, envelope};
use crate::services::meal_service::MealService;
use crate::services::menu_service::MenuService;

#[derive(Deserialize)]
pub struct MenuQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// GET /menu?from=..&to=.. - menu entries in an inclusive date range,
/// joined with their meals (PROTECTED)
#[get("")]
pub async fn get_menu(
    _auth_user: AuthUser,
    query: web::Query<MenuQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    let rows = MenuService::entries_between(db.get_ref(), query.from, query.to).await?;

    // One batched name lookup for the whole range instead of one query
    // per entry.
    let meal_ids: Vec<i32> = rows.iter().map(|(entry, _)| entry.meal_id).collect();
    let names = MealService::names_for(db.get_ref(), meal_ids).await?;

    let mut response = Vec::with_capacity(rows.len());
    for (entry, meal) in rows {
        let meal = meal.ok_or_else(|| {
            ApiError::Internal(format!("menu entry {} has no meal row", entry.id))
        })?;
        let name = names.get(&meal.id).cloned();
        response.push(MenuEntryResponse {
            uuid: entry.uuid,
            date: entry.date,
            canteen: entry.canteen_number,
            course: meal.course.clone(),
            course_number: entry.course_number,
            meal: MealResponse {
                uuid: meal.uuid,
                name,
                course: meal.course,
                description: meal.description,
            },
        });
    }

    Ok(envelope("/api/menu", response))
}

pub fn menu_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(web::scope("/menu").service(get_menu));
}
