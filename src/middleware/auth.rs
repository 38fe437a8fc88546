use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::errors::ApiError;
use crate::services::account_service::AccountService;

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// session token. Declaring this as a handler parameter makes the route
/// protected.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub name: String,
}

pub(crate) fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(str::to_owned)
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Missing header, malformed header, unknown token and expired
        // token all collapse into InvalidAuthentication.
        let token = bearer_token(req);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            let db = db.ok_or_else(|| {
                ApiError::Internal("database connection missing from app data".to_string())
            })?;
            let token = token.ok_or(ApiError::InvalidAuthentication)?;

            let (user, _session) = AccountService::authenticate(db.get_ref(), &token).await?;
            Ok(AuthUser {
                user_id: user.id,
                email: user.email,
                name: user.name,
            })
        })
    }
}
