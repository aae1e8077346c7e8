use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per (namespace, place_id); writes upsert on that pair.
        // `token` is JSON text, or AES-256-GCM sealed base64 when `encrypted`.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS oauth_relay.oauth_tokens (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),

                namespace VARCHAR(255) NOT NULL,
                place_id VARCHAR(255) NOT NULL,
                user_id VARCHAR(255) NOT NULL,

                token TEXT NOT NULL,
                encrypted BOOLEAN NOT NULL DEFAULT FALSE,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                UNIQUE(namespace, place_id)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS oauth_relay.oauth_tokens")
            .await?;

        Ok(())
    }
}
