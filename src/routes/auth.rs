use actix_web::{HttpRequest, HttpResponse, get, post, web};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::Result;
use crate::middleware::AuthUser;
use crate::middleware::auth::bearer_token;
use crate::routes::validated;
use crate::services::account_service::AccountService;

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    #[validate(length(min = 7, max = 128))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct VerifyRequest {
    #[validate(length(min = 1))]
    pub code: String,
}

#[derive(Deserialize, Validate)]
pub struct ResendRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: chrono::NaiveDateTime,
    pub user_id: i32,
    pub name: String,
}

/// POST /auth/register - start a signup (PUBLIC)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    validated(&*body)?;

    let registration = AccountService::register(db.get_ref(), &body.email, &body.name, &body.password).await?;

    // Mail delivery is not wired up; surface the code to the operator
    // log so manual verification stays possible.
    tracing::info!(
        registration_id = registration.id,
        code = %registration.code,
        "verification code issued"
    );

    Ok(crate::models::dto::envelope_created(
        "/api/auth/register",
        serde_json::json!({
            "email": registration.email,
            "name": registration.name,
            "expires_at": registration.expires_at,
        }),
    ))
}

/// POST /auth/verify - redeem a verification code (PUBLIC)
#[post("/verify")]
pub async fn verify(
    body: web::Json<VerifyRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    validated(&*body)?;

    let user = AccountService::verify(db.get_ref(), &body.code).await?;
    Ok(crate::models::dto::envelope("/api/auth/verify", user))
}

/// POST /auth/resend - fresh verification code for an existing
/// unverified account (PUBLIC, credential-checked)
#[post("/resend")]
pub async fn resend(
    body: web::Json<ResendRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    validated(&*body)?;

    let verification =
        AccountService::resend_verification(db.get_ref(), &body.email, &body.password).await?;

    tracing::info!(
        verification_id = verification.id,
        code = %verification.code,
        "verification code reissued"
    );

    Ok(crate::models::dto::envelope(
        "/api/auth/resend",
        serde_json::json!({ "expires_at": verification.expires_at }),
    ))
}

/// POST /auth/login - check credentials, mint a session (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse> {
    validated(&*body)?;

    let (user, session) = AccountService::login(db.get_ref(), &body.email, &body.password).await?;
    Ok(crate::models::dto::envelope(
        "/api/auth/login",
        SessionResponse {
            token: session.token,
            expires_at: session.expires_at,
            user_id: user.id,
            name: user.name,
        },
    ))
}

/// POST /auth/logout - invalidate the presented session (PROTECTED)
#[post("/logout")]
pub async fn logout(req: HttpRequest, db: web::Data<DatabaseConnection>) -> Result<HttpResponse> {
    let token = bearer_token(&req).ok_or(crate::errors::ApiError::InvalidAuthentication)?;
    AccountService::logout(db.get_ref(), &token).await?;
    Ok(crate::models::dto::envelope(
        "/api/auth/logout",
        serde_json::json!({ "logged_out": true }),
    ))
}

/// GET /auth/me - who does this token belong to (PROTECTED)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> Result<HttpResponse> {
    Ok(crate::models::dto::envelope("/api/auth/me", auth_user))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(verify)
            .service(resend)
            .service(login)
            .service(logout)
            .service(me),
    );
}
