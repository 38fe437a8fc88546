pub mod auth;
pub mod health;
pub mod meals;
pub mod menu;
pub mod photos;
pub mod ratings;

use actix_web::web;
use validator::Validate;

use crate::errors::{ApiError, Result};

/// Runs the derive-based validation and reports the first offending
/// parameter by name.
pub(crate) fn validated(request: &impl Validate) -> Result<()> {
    request.validate().map_err(|errors| {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "body".to_string());
        ApiError::Validation(field)
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(meals::meals_routes)
            .configure(menu::menu_routes)
            .configure(ratings::ratings_routes)
            .configure(photos::photos_routes),
    );
}
