#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fairing::AdHoc;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use rocket::{Build, Rocket};

pub mod api;
pub mod attendance;
pub mod auth_guards;
pub mod broadcaster;
pub mod catchers;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod logged_json;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod policy;
pub mod schema;
pub mod super_admin_bootstrap;
pub mod timestamps;
pub mod token;

#[cfg(test)]
pub mod generate_types;

/// Package version, build time and git commit recorded by `build.rs`.
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

use broadcaster::Broadcaster;
use clock::{ClockHandle, SystemClock};
use config::AppConfig;
use token::TokenService;

/// Secrets shorter than this are accepted but logged as weak.
const MIN_SECRET_BYTES: usize = 32;

/// Logs where the server ended up listening and which database it opened.
fn liftoff_report() -> AdHoc {
    AdHoc::on_liftoff("Liftoff Report", |rocket| {
        Box::pin(async move {
            let config = rocket.config();
            info!("Listening on {}:{}", config.address, config.port);
            match rocket
                .figment()
                .extract_inner::<String>("databases.sqlite_db.url")
            {
                Ok(url) => info!("Database: {}", url),
                Err(e) => warn!("No database url in configuration: {}", e),
            }
        })
    })
}

/// Puts the token service and the broadcaster into managed state, built
/// from the extracted [`AppConfig`].
fn services_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Token Service and Broadcaster", |rocket| async {
        let Some(config) = rocket.state::<AppConfig>().cloned() else {
            error!("Application configuration was not extracted");
            return Err(rocket);
        };
        if config.jwt_secret.len() < MIN_SECRET_BYTES {
            warn!(
                "jwt_secret is shorter than {} bytes; use a longer secret in production",
                MIN_SECRET_BYTES
            );
        }
        info!(
            "Tokens: issuer '{}', audience '{}', valid for {} days",
            config.jwt_issuer, config.jwt_audience, config.jwt_ttl_days
        );
        info!("Fallback timezone: {}", config.fallback_timezone().name());

        let tokens = TokenService::new(
            &config.jwt_secret,
            &config.jwt_issuer,
            &config.jwt_audience,
            config.jwt_ttl_days,
        );
        Ok(rocket
            .manage(tokens)
            .manage(Broadcaster::new(config.broadcast_capacity)))
    })
}

/// Assembles the application on top of the given configuration and clock.
///
/// Production goes through [`rocket`]; the test harness in
/// [`orm::testing`] passes an in-memory database and a fixed clock.
pub fn build_rocket(figment: Figment, clock: ClockHandle) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(orm::schema_fairing())
        .attach(super_admin_bootstrap::super_admin_fairing())
        .attach(AdHoc::config::<AppConfig>())
        .attach(services_fairing())
        .attach(liftoff_report())
        .manage(clock)
        .register("/", catchers::all())
        .mount("/api", api::routes())
}

/// The production entry point: `.env`, then `Rocket.toml`, then `ROCKET_*`
/// variables, with `DATABASE_URL` overriding the configured database.
pub fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let mut figment = Figment::from(rocket::Config::default())
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global());
    match std::env::var("DATABASE_URL") {
        Ok(database_url) => figment = figment.merge(("databases.sqlite_db.url", database_url)),
        Err(_) => warn!("DATABASE_URL is not set; using databases.sqlite_db.url from Rocket.toml"),
    }

    let clock: ClockHandle = Arc::new(SystemClock);
    build_rocket(figment, clock)
}
