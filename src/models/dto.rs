// Response shapes shared by the route modules, plus the response
// envelope every endpoint wraps its payload in.
use actix_web::HttpResponse;
use serde::Serialize;

/// Standard success envelope: `{ success, endpoint, timestamp, data }`.
/// The error counterpart is produced by ApiError::error_response.
pub fn envelope(endpoint: &str, data: impl Serialize) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "endpoint": endpoint,
        "timestamp": chrono::Utc::now().timestamp_millis(),
        "data": data,
    }))
}

/// Same envelope with 201 Created, for register/rate/photo-upload.
pub fn envelope_created(endpoint: &str, data: impl Serialize) -> HttpResponse {
    HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "endpoint": endpoint,
        "timestamp": chrono::Utc::now().timestamp_millis(),
        "data": data,
    }))
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub uuid: uuid::Uuid,
    pub name: Option<String>,
    pub course: String,
    pub description: Option<String>,
}

/// One menu entry joined with its meal, as served by GET /api/menu.
#[derive(Debug, Serialize)]
pub struct MenuEntryResponse {
    pub uuid: uuid::Uuid,
    pub date: chrono::NaiveDate,
    pub canteen: String,
    pub course: String,
    pub course_number: Option<i32>,
    pub meal: MealResponse,
}

#[derive(Debug, Serialize)]
pub struct MealAverageResponse {
    pub meal_uuid: uuid::Uuid,
    pub average: f64,
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub uuid: uuid::Uuid,
    pub meal_uuid: uuid::Uuid,
    pub uploaded: chrono::NaiveDateTime,
}
