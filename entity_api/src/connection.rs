//! Entity API for the connection registry table.
//!
//! Every write is idempotent: `upsert` overwrites the routing columns of an
//! existing row, `delete` succeeds whether or not the row exists.

use entity::connections::{ActiveModel, Column, Entity, Model};
use sea_orm::{sea_query::OnConflict, entity::prelude::*, ActiveValue::Set, ConnectionTrait};

use log::*;

use super::error::Error;

/// Inserts a connection row, or refreshes `domain_name`, `stage` and
/// `updated_at` if a row with the same id already exists.
///
/// # Errors
///
/// Returns `Error` if the database write fails.
pub async fn upsert(
    db: &impl ConnectionTrait,
    connection_id: &str,
    domain_name: &str,
    stage: &str,
) -> Result<(), Error> {
    debug!("Upserting connection row: connection_id={connection_id}, domain_name={domain_name}, stage={stage}");

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        connection_id: Set(connection_id.to_string()),
        domain_name: Set(domain_name.to_string()),
        stage: Set(stage.to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Entity::insert(active_model)
        .on_conflict(
            OnConflict::column(Column::ConnectionId)
                .update_columns([Column::DomainName, Column::Stage, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// Deletes the row for `connection_id`. Returns the number of rows removed,
/// which is zero when the connection was not registered.
///
/// # Errors
///
/// Returns `Error` if the database delete fails.
pub async fn delete(db: &impl ConnectionTrait, connection_id: &str) -> Result<u64, Error> {
    debug!("Deleting connection row: connection_id={connection_id}");

    let result = Entity::delete_by_id(connection_id.to_string())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Reads every connection row.
///
/// # Errors
///
/// Returns `Error` if the database query fails.
pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    let connections = Entity::find().all(db).await?;

    trace!("Read {} connection rows", connections.len());

    Ok(connections)
}
