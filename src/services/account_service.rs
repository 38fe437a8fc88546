use chrono::{Duration, NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::canteens;
use crate::errors::{ApiError, Result};
use crate::models::{registrations, sessions, users, verifications};
use crate::utils::{password, tokens};

fn session_duration() -> Duration {
    Duration::days(30)
}

fn registration_duration() -> Duration {
    Duration::minutes(15)
}

fn verification_duration() -> Duration {
    Duration::minutes(15)
}

/// Expiry is boundary-inclusive: a row whose expiration equals "now" is
/// already expired. Consumption (logout, code redemption) forces
/// expires_at to now, which is why the boundary has to count.
pub fn expired(expires_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    now >= expires_at
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Registration, verification and session lifecycle.
///
/// All three share one shape: created -> ACTIVE -> EXPIRED, where the
/// terminal state is reached by time or by explicit consumption, never
/// reversed. Rows are force-expired rather than deleted.
pub struct AccountService;

impl AccountService {
    /// Starts a signup for (email, name).
    ///
    /// The email must belong to exactly one known canteen and both email
    /// and name must be free among existing users. If an ACTIVE
    /// registration for the same (email, name) already exists, a
    /// matching password is treated as a resend (the stored salt+hash is
    /// reused, a new code goes out); a mismatch is reported as
    /// NAME_NOT_UNIQUE so repeated signup attempts cannot enumerate
    /// other people's pending registrations.
    ///
    /// Returns the new registration row; the caller is responsible for
    /// delivering `code` to the address (mail is outside this crate).
    pub async fn register(
        db: &DatabaseConnection,
        email: &str,
        name: &str,
        plain_password: &str,
    ) -> Result<registrations::Model> {
        let canteen = canteens::by_email(email)?;

        if users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ApiError::EmailNotUnique);
        }
        if users::Entity::find()
            .filter(users::Column::Name.eq(name))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ApiError::NameNotUnique);
        }

        let now = now();
        let active = registrations::Entity::find()
            .filter(registrations::Column::Email.eq(email))
            .filter(registrations::Column::Name.eq(name))
            .all(db)
            .await?
            .into_iter()
            .find(|r| !expired(r.expires_at, now));

        let (hash, salt) = match active {
            Some(ref pending)
                if password::validate_password(
                    plain_password,
                    &pending.password_hash,
                    &pending.password_salt,
                )? =>
            {
                // Same person asking again before the first code aged
                // out: reuse the stored credentials, mint a new code.
                (pending.password_hash.clone(), pending.password_salt.clone())
            }
            Some(_) => return Err(ApiError::NameNotUnique),
            None => {
                let salt = tokens::random_salt();
                let hash = password::hash_password(plain_password, &salt)?;
                (hash, salt)
            }
        };

        let registration = registrations::ActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            canteen_number: Set(canteen.number.to_string()),
            created: Set(now),
            expires_at: Set(now + registration_duration()),
            password_hash: Set(hash),
            password_salt: Set(salt),
            code: Set(tokens::random_verification_code()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(email, name, canteen = canteen.name, "registration created");
        Ok(registration)
    }

    /// Redeems a single-use code.
    ///
    /// A registration code creates the user (verified, in the same
    /// logical operation) and force-expires the consumed row. A
    /// verification code flips an existing user's flag and force-expires
    /// all of that user's verification rows, not just the redeemed one.
    pub async fn verify(db: &DatabaseConnection, code: &str) -> Result<users::Model> {
        let now = now();

        if let Some(registration) = registrations::Entity::find()
            .filter(registrations::Column::Code.eq(code))
            .one(db)
            .await?
        {
            if expired(registration.expires_at, now) {
                return Err(ApiError::CodeExpired);
            }
            return Self::redeem_registration(db, registration, now).await;
        }

        if let Some(verification) = verifications::Entity::find()
            .filter(verifications::Column::Code.eq(code))
            .one(db)
            .await?
        {
            if expired(verification.expires_at, now) {
                return Err(ApiError::CodeExpired);
            }
            return Self::redeem_verification(db, verification, now).await;
        }

        Err(ApiError::CodeInvalid)
    }

    async fn redeem_registration(
        db: &DatabaseConnection,
        registration: registrations::Model,
        now: NaiveDateTime,
    ) -> Result<users::Model> {
        // The name or email may have been taken by another signup
        // verified in the meantime.
        if users::Entity::find()
            .filter(users::Column::Email.eq(&registration.email))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ApiError::EmailNotUnique);
        }
        if users::Entity::find()
            .filter(users::Column::Name.eq(&registration.name))
            .one(db)
            .await?
            .is_some()
        {
            return Err(ApiError::NameNotUnique);
        }

        // The user starts unverified and is flipped by mark_verified
        // below, inside the same redemption. If the process dies between
        // the two writes, the account is recoverable through
        // resend_verification instead of being stuck.
        let user = users::ActiveModel {
            email: Set(registration.email.clone()),
            name: Set(registration.name.clone()),
            verified: Set(false),
            registered: Set(now),
            password_hash: Set(registration.password_hash.clone()),
            password_salt: Set(registration.password_salt.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        // Expire-on-use: the code can never be redeemed twice.
        let mut consumed: registrations::ActiveModel = registration.into();
        consumed.expires_at = Set(now);
        consumed.update(db).await?;

        let user = Self::mark_verified(db, user, now).await?;
        tracing::info!(user_id = user.id, "registration verified, user created");
        Ok(user)
    }

    async fn redeem_verification(
        db: &DatabaseConnection,
        verification: verifications::Model,
        now: NaiveDateTime,
    ) -> Result<users::Model> {
        let user = users::Entity::find_by_id(verification.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!(
                    "verification {} points at missing user {}",
                    verification.id, verification.user_id
                ))
            })?;

        let user = Self::mark_verified(db, user, now).await?;
        tracing::info!(user_id = user.id, "user verified");
        Ok(user)
    }

    /// The single place the verified flag flips. Also bulk-expires the
    /// user's verification rows, so stale codes die with the redeemed
    /// one.
    async fn mark_verified(
        db: &DatabaseConnection,
        user: users::Model,
        now: NaiveDateTime,
    ) -> Result<users::Model> {
        let user_id = user.id;
        let mut verified: users::ActiveModel = user.into();
        verified.verified = Set(true);
        let user = verified.update(db).await?;

        verifications::Entity::update_many()
            .col_expr(verifications::Column::ExpiresAt, Expr::value(now))
            .filter(verifications::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        Ok(user)
    }

    /// Recovery path for an account that exists but never got verified
    /// (a redemption interrupted between user creation and the flag
    /// flip): re-checks the credentials and mints a fresh verification
    /// code for the /auth/verify route.
    pub async fn resend_verification(
        db: &DatabaseConnection,
        email: &str,
        plain_password: &str,
    ) -> Result<verifications::Model> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !password::validate_password(plain_password, &user.password_hash, &user.password_salt)? {
            return Err(ApiError::InvalidCredentials);
        }
        if user.verified {
            return Err(ApiError::AlreadyVerified);
        }

        Self::issue_verification(db, user.id).await
    }

    /// Issues a fresh verification code for an existing unverified user.
    pub async fn issue_verification(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<verifications::Model> {
        let now = now();
        verifications::ActiveModel {
            user_id: Set(user_id),
            created: Set(now),
            expires_at: Set(now + verification_duration()),
            code: Set(tokens::random_verification_code()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(Into::into)
    }

    /// Checks credentials and mints a 30-day bearer session.
    ///
    /// Unknown email and wrong password collapse into the same error.
    pub async fn login(
        db: &DatabaseConnection,
        email: &str,
        plain_password: &str,
    ) -> Result<(users::Model, sessions::Model)> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !password::validate_password(plain_password, &user.password_hash, &user.password_salt)? {
            return Err(ApiError::InvalidCredentials);
        }
        if !user.verified {
            return Err(ApiError::NotVerified);
        }

        let now = now();
        let session = sessions::ActiveModel {
            user_id: Set(user.id),
            created: Set(now),
            expires_at: Set(now + session_duration()),
            token: Set(tokens::random_session_token()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(user_id = user.id, "login");
        Ok((user, session))
    }

    /// Resolves a bearer token to its user. Absent and expired sessions
    /// are indistinguishable to the caller; the difference is only
    /// logged.
    pub async fn authenticate(
        db: &DatabaseConnection,
        token: &str,
    ) -> Result<(users::Model, sessions::Model)> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .one(db)
            .await?
            .ok_or(ApiError::InvalidAuthentication)?;

        if expired(session.expires_at, now()) {
            tracing::debug!(session_id = session.id, "rejected expired session");
            return Err(ApiError::InvalidAuthentication);
        }

        let user = users::Entity::find_by_id(session.user_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!(
                    "session {} points at missing user {}",
                    session.id, session.user_id
                ))
            })?;

        Ok((user, session))
    }

    /// Invalidates a session by forcing its expiration to now.
    pub async fn logout(db: &DatabaseConnection, token: &str) -> Result<()> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::Token.eq(token))
            .one(db)
            .await?
            .ok_or(ApiError::InvalidAuthentication)?;

        let mut consumed: sessions::ActiveModel = session.into();
        consumed.expires_at = Set(now());
        consumed.update(db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_utils::setup_test_db;

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let instant = now();
        assert!(expired(instant, instant));
        assert!(expired(instant, instant + Duration::milliseconds(1)));
        assert!(!expired(instant + Duration::milliseconds(1), instant));
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_email_domain() {
        let db = setup_test_db().await.unwrap();
        let result = AccountService::register(&db, "stu@elsewhere.example", "stu", "pw12345").await;
        assert!(matches!(result, Err(ApiError::NoMatchingCanteen)));
    }

    #[tokio::test]
    async fn test_registration_conflict_resolution() {
        let db = setup_test_db().await.unwrap();

        let first = AccountService::register(&db, "a@ceskolipska.cz", "bob", "p1")
            .await
            .unwrap();

        // Same password while the first registration is still active:
        // treated as a resend reusing the stored salt+hash.
        let resend = AccountService::register(&db, "a@ceskolipska.cz", "bob", "p1")
            .await
            .unwrap();
        assert_eq!(resend.password_hash, first.password_hash);
        assert_eq!(resend.password_salt, first.password_salt);
        assert_ne!(resend.code, first.code);

        // Different password: the name is reported as taken.
        let mismatch = AccountService::register(&db, "a@ceskolipska.cz", "bob", "p2").await;
        assert!(matches!(mismatch, Err(ApiError::NameNotUnique)));
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_and_expired_codes() {
        let db = setup_test_db().await.unwrap();

        assert!(matches!(
            AccountService::verify(&db, "no-such-code").await,
            Err(ApiError::CodeInvalid)
        ));

        let registration = AccountService::register(&db, "a@ceskolipska.cz", "bob", "pw12345")
            .await
            .unwrap();
        let code = registration.code.clone();

        let mut stale: registrations::ActiveModel = registration.into();
        stale.expires_at = Set(now() - Duration::minutes(1));
        stale.update(&db).await.unwrap();

        assert!(matches!(
            AccountService::verify(&db, &code).await,
            Err(ApiError::CodeExpired)
        ));
    }

    #[tokio::test]
    async fn test_registration_code_is_single_use() {
        let db = setup_test_db().await.unwrap();

        let registration = AccountService::register(&db, "a@ceskolipska.cz", "bob", "pw12345")
            .await
            .unwrap();
        let code = registration.code.clone();

        AccountService::verify(&db, &code).await.unwrap();
        // Expire-on-use: the second redemption sees an expired row.
        assert!(matches!(
            AccountService::verify(&db, &code).await,
            Err(ApiError::CodeExpired)
        ));
    }

    #[tokio::test]
    async fn test_verification_redemption_bulk_expires() {
        let db = setup_test_db().await.unwrap();

        let registration = AccountService::register(&db, "a@ceskolipska.cz", "bob", "pw12345")
            .await
            .unwrap();
        let user = AccountService::verify(&db, &registration.code).await.unwrap();

        let first = AccountService::issue_verification(&db, user.id).await.unwrap();
        let second = AccountService::issue_verification(&db, user.id).await.unwrap();

        AccountService::verify(&db, &second.code).await.unwrap();

        // Redeeming one code kills the user's whole set.
        assert!(matches!(
            AccountService::verify(&db, &first.code).await,
            Err(ApiError::CodeExpired)
        ));
    }

    #[tokio::test]
    async fn test_resend_recovers_an_unverified_account() {
        let db = setup_test_db().await.unwrap();

        // An interrupted redemption leaves the user created but never
        // flipped to verified; resend is the way back in.
        let salt = tokens::random_salt();
        let hash = password::hash_password("pw12345", &salt).unwrap();
        let user = users::ActiveModel {
            email: Set("s@ceskolipska.cz".to_string()),
            name: Set("stu".to_string()),
            verified: Set(false),
            registered: Set(now()),
            password_hash: Set(hash),
            password_salt: Set(salt),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        assert!(matches!(
            AccountService::login(&db, "s@ceskolipska.cz", "pw12345").await,
            Err(ApiError::NotVerified)
        ));
        assert!(matches!(
            AccountService::resend_verification(&db, "s@ceskolipska.cz", "wrong-pw").await,
            Err(ApiError::InvalidCredentials)
        ));

        let verification =
            AccountService::resend_verification(&db, "s@ceskolipska.cz", "pw12345")
                .await
                .unwrap();
        let verified = AccountService::verify(&db, &verification.code).await.unwrap();
        assert_eq!(verified.id, user.id);
        assert!(verified.verified);

        // Once verified, another resend is refused and login works.
        assert!(matches!(
            AccountService::resend_verification(&db, "s@ceskolipska.cz", "pw12345").await,
            Err(ApiError::AlreadyVerified)
        ));
        AccountService::login(&db, "s@ceskolipska.cz", "pw12345")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_register_verify_login_authenticate() {
        let db = setup_test_db().await.unwrap();

        let registration = AccountService::register(&db, "s@ceskolipska.cz", "stu", "pw12345")
            .await
            .unwrap();
        let user = AccountService::verify(&db, &registration.code).await.unwrap();
        assert!(user.verified);

        let (logged_in, session) = AccountService::login(&db, "s@ceskolipska.cz", "pw12345")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        // Session lifetime is 30 days, give or take test runtime.
        let lifetime = session.expires_at - session.created;
        assert_eq!(lifetime, Duration::days(30));

        let (authed, _) = AccountService::authenticate(&db, &session.token).await.unwrap();
        assert_eq!(authed.id, user.id);

        AccountService::logout(&db, &session.token).await.unwrap();
        assert!(matches!(
            AccountService::authenticate(&db, &session.token).await,
            Err(ApiError::InvalidAuthentication)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_undifferentiated() {
        let db = setup_test_db().await.unwrap();

        let registration = AccountService::register(&db, "s@ceskolipska.cz", "stu", "pw12345")
            .await
            .unwrap();
        AccountService::verify(&db, &registration.code).await.unwrap();

        let unknown = AccountService::login(&db, "nobody@ceskolipska.cz", "pw12345").await;
        let wrong = AccountService::login(&db, "s@ceskolipska.cz", "wrong-pw").await;
        assert!(matches!(unknown, Err(ApiError::InvalidCredentials)));
        assert!(matches!(wrong, Err(ApiError::InvalidCredentials)));
    }
}
