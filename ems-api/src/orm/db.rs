use diesel::connection::SimpleConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::fairing::AdHoc;
use rocket_sync_db_pools::{database, diesel};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[database("sqlite_db")]
pub struct DbConn(diesel::SqliteConnection);

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("could not enable foreign keys: {0}")]
    ForeignKeys(#[from] diesel::result::Error),
    #[error("migration failed: {0}")]
    Migration(String),
}

/// Turns on foreign key enforcement and applies outstanding migrations.
///
/// SQLite ships with foreign keys off, and the cascade and set-null rules in
/// the schema depend on them. Returns how many migrations were applied.
pub fn prepare_schema(conn: &mut diesel::SqliteConnection) -> Result<usize, SchemaError> {
    conn.batch_execute("PRAGMA foreign_keys = ON")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| SchemaError::Migration(e.to_string()))?;
    Ok(applied.len())
}

/// Prepares the pooled database before launch. Ignition fails if no
/// connection can be taken from the pool or the schema step errors.
pub fn schema_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Database Schema", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("No database connection available for schema setup");
            return Err(rocket);
        };
        match conn.run(prepare_schema).await {
            Ok(0) => debug!("Database schema is up to date"),
            Ok(n) => info!("Applied {} database migration(s)", n),
            Err(e) => {
                error!("Database schema setup failed: {}", e);
                return Err(rocket);
            }
        }
        Ok(rocket)
    })
}
