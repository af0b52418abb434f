//! Test harness: in-memory databases and a ready-to-launch Rocket.
//!
//! Each call to [`test_rocket`] gets its own shared-cache in-memory SQLite
//! database, so tests never see each other's rows.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use uuid::Uuid;

use super::db::{DbConn, prepare_schema};
use crate::clock::{ClockHandle, FixedClock};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// 2025-03-10 04:00 UTC, which is 09:30 in Asia/Kolkata.
pub fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 10)
        .and_then(|d| d.and_hms_opt(4, 0, 0))
        .expect("valid fixed instant")
}

/// Trades durability for speed on the test pool.
fn test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Test Pragmas", |rocket| async {
        if let Some(conn) = DbConn::get_one(&rocket).await {
            conn.run(|c| c.batch_execute("PRAGMA synchronous = OFF"))
                .await
                .expect("test pragmas apply");
        }
        rocket
    })
}

/// Rocket instance backed by a fresh in-memory database, with the clock
/// pinned at [`fixed_now`].
pub fn test_rocket() -> Rocket<Build> {
    test_rocket_with_clock(Arc::new(FixedClock::new(fixed_now())))
}

/// Like [`test_rocket`], but the caller keeps a handle on the clock and can
/// move it between requests.
pub fn test_rocket_with_clock(clock: Arc<FixedClock>) -> Rocket<Build> {
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());
    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };
    let document_dir = std::env::temp_dir().join(format!("ems_documents_{}", Uuid::new_v4()));

    let figment = rocket::Config::figment()
        .merge(("databases", map!["sqlite_db" => db_config]))
        .merge(("jwt_secret", TEST_JWT_SECRET))
        .merge(("document_dir", document_dir.to_string_lossy().to_string()));

    let clock: ClockHandle = clock;
    crate::build_rocket(figment, clock).attach(test_pragmas_fairing())
}

/// Sets up a migrated in-memory SQLite database for unit tests.
///
/// # Panics
/// Panics if the database cannot be created or migrations fail
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    prepare_schema(&mut conn).expect("schema setup on in-memory database");
    conn
}

/// A minimal async-compatible wrapper for a synchronous SQLite connection.
///
/// Lets unit tests call functions written against [`crate::orm::login::DbRunner`]
/// with a connection from [`setup_test_db`].
pub struct FakeDbConn<'a>(Mutex<&'a mut SqliteConnection>);

impl<'a> FakeDbConn<'a> {
    /// Runs the closure on the wrapped connection, mirroring `DbConn::run`.
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut guard = self.0.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut **guard)
    }
}

pub fn setup_test_dbconn(conn: &mut SqliteConnection) -> FakeDbConn<'_> {
    FakeDbConn(Mutex::new(conn))
}

/// Registers "Acme Inc" with admin `ada@acme.test` and returns both rows.
///
/// # Panics
/// Panics if registration fails
pub fn register_test_company(conn: &mut SqliteConnection) -> (crate::models::Company, crate::models::User) {
    register_named_company(conn, "Acme Inc", "ada@acme.test")
}

pub fn register_named_company(
    conn: &mut SqliteConnection,
    name: &str,
    admin_email: &str,
) -> (crate::models::Company, crate::models::User) {
    crate::orm::company::register_company(
        conn,
        crate::orm::company::Registration {
            company_name: name.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Admin".to_string(),
            email: admin_email.to_string(),
            password_hash: "unused-hash".to_string(),
        },
        fixed_now(),
    )
    .expect("test company registration")
}
