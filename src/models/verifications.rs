use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-use email-ownership code tied to an existing user.
///
/// Redeeming one marks the owning user verified and force-expires all
/// of that user's verification rows, not just the redeemed one.
/// Same 15-minute lifetime and expire-on-use semantics as registrations.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "verifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub created: DateTime,
    pub expires_at: DateTime,
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
