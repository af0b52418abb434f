//! Creates the platform super admin from the environment at ignition.

use diesel::prelude::*;
use rocket::fairing::AdHoc;

use crate::error::ApiResult;
use crate::models::NewSuperAdmin;
use crate::orm::DbConn;
use crate::orm::login::hash_password;
use crate::orm::lower;
use crate::schema::super_admins;

pub const SUPERADMIN_EMAIL_VAR: &str = "EMS_SUPERADMIN_EMAIL";
pub const SUPERADMIN_PASSWORD_VAR: &str = "EMS_SUPERADMIN_PASSWORD";

/// Whether the bootstrap inserted a row or found one with the same email.
#[derive(Debug, PartialEq, Eq)]
enum Bootstrap {
    Created,
    AlreadyPresent,
}

/// Ensures a super admin exists when both credential variables are set.
/// Leaving either unset disables the bootstrap; a failed insert aborts
/// launch.
pub fn super_admin_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Super Admin Bootstrap", |rocket| async {
        dotenvy::dotenv().ok();
        let Some((email, password)) = credentials_from_env() else {
            debug!(
                "{} or {} unset; no super admin bootstrap",
                SUPERADMIN_EMAIL_VAR, SUPERADMIN_PASSWORD_VAR
            );
            return Ok(rocket);
        };
        let Some(conn) = DbConn::get_one(&rocket).await else {
            error!("No database connection available for super admin bootstrap");
            return Err(rocket);
        };

        let label = email.clone();
        match conn.run(move |c| ensure_super_admin(c, &email, &password)).await {
            Ok(Bootstrap::Created) => info!("Created super admin '{}'", label),
            Ok(Bootstrap::AlreadyPresent) => debug!("Super admin '{}' already present", label),
            Err(e) => {
                error!("Super admin bootstrap failed for '{}': {}", label, e);
                return Err(rocket);
            }
        }
        Ok(rocket)
    })
}

fn credentials_from_env() -> Option<(String, String)> {
    let email = std::env::var(SUPERADMIN_EMAIL_VAR).ok()?.trim().to_string();
    let password = std::env::var(SUPERADMIN_PASSWORD_VAR).ok()?;
    (!email.is_empty() && !password.is_empty()).then_some((email, password))
}

fn ensure_super_admin(
    conn: &mut SqliteConnection,
    email: &str,
    password: &str,
) -> ApiResult<Bootstrap> {
    let existing: i64 = super_admins::table
        .filter(lower(super_admins::email).eq(email.to_lowercase()))
        .count()
        .get_result(conn)?;
    if existing > 0 {
        return Ok(Bootstrap::AlreadyPresent);
    }

    let admin = NewSuperAdmin {
        email: email.to_string(),
        password_hash: hash_password(password)?,
    };
    diesel::insert_into(super_admins::table)
        .values(&admin)
        .execute(conn)?;
    Ok(Bootstrap::Created)
}
