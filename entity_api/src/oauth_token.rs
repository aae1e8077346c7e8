use super::error::Error;
use entity::oauth_tokens::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, DatabaseConnection};

/// Fields written for a token on every successful exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenWrite {
    pub namespace: String,
    pub place_id: String,
    pub user_id: String,
    pub token: String,
    pub encrypted: bool,
}

/// Inserts the token for `(namespace, place_id)` or replaces the existing one.
/// Last write wins; `created_at` of an existing row is kept.
pub async fn upsert(db: &DatabaseConnection, write: TokenWrite) -> Result<(), Error> {
    debug!(
        "Upserting OAuth token for namespace: {}, place_id: {}",
        write.namespace, write.place_id
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        namespace: Set(write.namespace),
        place_id: Set(write.place_id),
        user_id: Set(write.user_id),
        token: Set(write.token),
        encrypted: Set(write.encrypted),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Entity::insert(active_model)
        .on_conflict(
            OnConflict::columns([Column::Namespace, Column::PlaceId])
                .update_columns([
                    Column::UserId,
                    Column::Token,
                    Column::Encrypted,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Finds the token stored for a place within a namespace
pub async fn find_by_namespace_and_place(
    db: &DatabaseConnection,
    namespace: &str,
    place_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::Namespace.eq(namespace))
        .filter(Column::PlaceId.eq(place_id))
        .one(db)
        .await?)
}
