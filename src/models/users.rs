use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A verified (or pending-verification) account.
///
/// Created by redeeming a registration code; `verified` flips to true
/// exactly once and the row is otherwise immutable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub name: String,
    pub verified: bool,
    pub registered: DateTime,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sessions::Entity")]
    Session,

    #[sea_orm(has_many = "super::verifications::Entity")]
    Verification,

    #[sea_orm(has_many = "super::ratings::Entity")]
    Rating,

    #[sea_orm(has_many = "super::photos::Entity")]
    Photo,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::verifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Verification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
