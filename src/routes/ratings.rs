use actix_web::{HttpResponse, get, post, web};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::errors::Result;
use crate::middleware::AuthUser;
use crate::models::dto::{MealAverageResponse, envelope, envelope_created};
use crate::routes::validated;
use crate::services::rating_service::{Cohort, RatingService};

#[derive(Deserialize, Validate)]
pub struct RateRequest {
    pub menu_entry: Uuid,
    // Range is re-checked in the service; this catches garbage early
    // with a parameter name.
    #[validate(range(min = 1, max = 10))]
    pub rating: i32,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub cohort: String,
}

/// POST /ratings - rate one menu entry, upserts on resubmit (PROTECTED)
#[post("")]
pub async fn rate(
    auth_user: AuthUser,
    body: web::Json<RateRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    validated(&*body)?;

    let rating =
        RatingService::rate(db.get_ref(), auth_user.user_id, body.menu_entry, body.rating).await?;
    Ok(envelope_created("/api/ratings", rating))
}

/// GET /ratings/me - caller's per-meal averages (PROTECTED)
#[get("/me")]
pub async fn my_ratings(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    let averages = RatingService::ratings_for_user(db.get_ref(), auth_user.user_id).await?;

    let response: Vec<MealAverageResponse> = averages
        .into_iter()
        .map(|(meal_uuid, average)| MealAverageResponse { meal_uuid, average })
        .collect();
    Ok(envelope("/api/ratings/me", response))
}

/// GET /ratings?from=..&to=..&cohort=self|others - per-meal averages in
/// a date range, scoped to the caller or to everyone else (PROTECTED)
#[get("")]
pub async fn ratings_in_range(
    auth_user: AuthUser,
    query: web::Query<RangeQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    let cohort = Cohort::parse(&query.cohort)?;
    let averages = RatingService::ratings_in_range(
        db.get_ref(),
        query.from,
        query.to,
        cohort,
        auth_user.user_id,
    )
    .await?;

    Ok(envelope("/api/ratings", averages))
}

pub fn ratings_routes(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(
        web::scope("/ratings")
            .service(my_ratings)
            .service(ratings_in_range)
            .service(rate),
    );
}
