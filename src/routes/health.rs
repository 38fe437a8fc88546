use actix_web::{HttpResponse, get};

use crate::models::dto::envelope;

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    envelope("/api/health", serde_json::json!({ "status": "ok" }))
}
