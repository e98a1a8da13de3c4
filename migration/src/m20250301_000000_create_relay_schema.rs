use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS ws_relay;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO ws_relay, public;")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // CASCADE takes the registry table with it
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS ws_relay CASCADE;")
            .await?;

        Ok(())
    }
}
