use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A pending signup awaiting email verification.
///
/// Workflow:
///   1. POST /api/auth/register checks email/name availability and the
///      active-registration conflict rule, then inserts a row here with
///      a fresh single-use code (expires after 15 minutes).
///   2. The code goes out by email (delivery is outside this crate).
///   3. POST /api/auth/verify redeems the code: the user row is created
///      and this row's expires_at is forced to now (expire-on-use, the
///      row itself is never deleted).
///
/// At most one ACTIVE row per (email, name) pair is allowed at insert
/// time; resends reuse the stored salt+hash when the password matches.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email: String,
    pub name: String,
    pub canteen_number: String,
    pub created: DateTime,
    pub expires_at: DateTime,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
