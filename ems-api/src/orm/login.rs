//! Credential checks for login and the password rules applied on sign-up.
//!
//! Both tenant principals and the platform super admin authenticate here.
//! Token issuance happens in the API layer once a login succeeds.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use diesel::prelude::*;
use rand_core::OsRng;
use regex::Regex;

use crate::DbConn;
use crate::error::{ApiError, ApiResult};
use crate::identity::EmploymentStatus;
use crate::models::{Company, SuperAdmin, User};
use crate::orm::lower;
use crate::orm::testing::FakeDbConn;
use crate::schema::{companies, super_admins, users};

/// Company code that routes a login to the super-admin table.
pub const SUPER_ADMIN_CODE: &str = "superadmin";

pub const WEAK_PASSWORD_MESSAGE: &str = "Password must be at least 8 characters long and contain at least one uppercase letter, one lowercase letter, one number, and one special character.";

/// Something that can run a closure against a SQLite connection: the pooled
/// [`DbConn`] in handlers, [`FakeDbConn`] in unit tests.
pub trait DbRunner {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

impl<'a> DbRunner for FakeDbConn<'a> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Argon2 hash in PHC string form, salted per call.
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored hash. An unparseable hash never
/// verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

/// At least 8 characters with a lowercase letter, an uppercase letter, a
/// digit and a symbol.
pub fn is_strong_password(password: &str) -> bool {
    let rules = [r"[a-z]", r"[A-Z]", r"\d", r"[\W_]"];
    password.chars().count() >= 8
        && rules.iter().all(|rule| {
            Regex::new(rule)
                .map(|re| re.is_match(password))
                .unwrap_or(false)
        })
}

pub fn check_password_strength(password: &str) -> ApiResult<()> {
    if is_strong_password(password) {
        Ok(())
    } else {
        Err(ApiError::validation(WEAK_PASSWORD_MESSAGE))
    }
}

pub fn is_super_admin_code(company_code: &str) -> bool {
    company_code.trim().eq_ignore_ascii_case(SUPER_ADMIN_CODE)
}

pub async fn authenticate_super_admin<D: DbRunner>(
    db: &D,
    email: &str,
    password: &str,
) -> ApiResult<SuperAdmin> {
    let email = email.trim().to_owned();
    let found = db
        .run(move |conn| {
            super_admins::table
                .filter(lower(super_admins::email).eq(email.to_lowercase()))
                .select(SuperAdmin::as_select())
                .first(conn)
                .optional()
        })
        .await?;

    match found {
        Some(admin) if verify_password(password, &admin.password_hash) => Ok(admin),
        _ => Err(ApiError::unauthenticated("Invalid Super Admin credentials.")),
    }
}

/// Looks up the company by code (case-insensitive) and checks the user's
/// password within it.
pub async fn authenticate_user<D: DbRunner>(
    db: &D,
    company_code: &str,
    email: &str,
    password: &str,
) -> ApiResult<(Company, User)> {
    let code = company_code.trim().to_lowercase();
    let email = email.trim().to_owned();
    let found = db
        .run(move |conn| -> QueryResult<Option<(Company, Option<User>)>> {
            let company = companies::table
                .filter(companies::company_code.eq(&code))
                .select(Company::as_select())
                .first(conn)
                .optional()?;
            let Some(company) = company else {
                return Ok(None);
            };
            let user = users::table
                .filter(users::company_id.eq(company.id))
                .filter(lower(users::email).eq(email.to_lowercase()))
                .select(User::as_select())
                .first(conn)
                .optional()?;
            Ok(Some((company, user)))
        })
        .await?;

    let Some((company, user)) = found else {
        return Err(ApiError::unauthenticated("Invalid Company Code."));
    };
    let user = match user {
        Some(u) if verify_password(password, &u.password_hash) => u,
        _ => {
            return Err(ApiError::unauthenticated(
                "Invalid Email or Password for this company.",
            ));
        }
    };
    if user.status() != Some(EmploymentStatus::Active) {
        return Err(ApiError::unauthenticated("This account is inactive."));
    }
    Ok((company, user))
}
