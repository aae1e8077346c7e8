use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One stored provider token per (namespace, place).
///
/// `token` holds the provider entity as JSON text, or its AES-256-GCM sealed
/// form when `encrypted` is set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "oauth_relay", table_name = "oauth_tokens")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    pub namespace: String,
    pub place_id: String,
    pub user_id: String,
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub token: String,
    pub encrypted: bool,
    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
