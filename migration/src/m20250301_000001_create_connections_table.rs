use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // The primary key is the only constraint: a connection id maps to at
        // most one row, and the fanout path reads the table with a full scan.
        let create_table_sql = "CREATE TABLE IF NOT EXISTS ws_relay.connections (
            connection_id TEXT PRIMARY KEY,
            domain_name TEXT NOT NULL,
            stage TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )";

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS ws_relay.connections")
            .await?;

        Ok(())
    }
}
