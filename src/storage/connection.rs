use crate::storage::entity::{grade_draft, report_link_draft};
use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Schema,
    Statement,
};
use std::time::Duration;

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());
    // one connection: a pooled sibling would keep a schema cached from before
    // the unique indexes exist and reject the ON CONFLICT upserts
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(8))
        .max_lifetime(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA journal_mode=WAL;".to_string(),
    ))
    .await?;

    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let stmt = builder.build(
        schema
            .create_table_from_entity(grade_draft::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    let stmt = builder.build(
        schema
            .create_table_from_entity(report_link_draft::Entity)
            .if_not_exists(),
    );
    db.execute(stmt).await?;

    // upserts below conflict on these keys
    for sql in [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_grade_drafts_key ON grade_drafts(student_id, sprint, assignment);",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_report_link_drafts_key ON report_link_drafts(reviewed_team_id, sprint);",
    ] {
        db.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }

    info!("Draft store ready at {} (WAL)", db_url);

    Ok(db)
}
