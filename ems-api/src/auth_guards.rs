//! Bearer-token authentication and role guards for Rocket routes.
//!
//! Every guard verifies the JWT from the `Authorization: Bearer <token>`
//! header and then reloads the principal from the database, so the value a
//! handler receives reflects the current role, department and employment
//! status rather than whatever was true at login.
//!
//! ```rust,ignore
//! #[get("/1/employees")]
//! async fn list(db: DbConn, user: ManagerUser) -> ApiResult<Json<Vec<EmployeeSummary>>> {
//!     // user.principal carries the role and company of the caller
//! }
//! ```
//!
//! Guard failures are answered by the JSON catchers: 401 for a missing,
//! invalid or expired token, an inactive employee or a deleted principal,
//! and 403 when the principal's role is not allowed on the route.

use diesel::prelude::*;
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::identity::{EmploymentStatus, Principal, Role};
use crate::models::{SuperAdmin, User};
use crate::orm::user::find_in_company;
use crate::schema::super_admins;
use crate::token::{Claims, TokenService};

/// Query parameter accepted in place of the header on the event stream,
/// where browsers cannot set headers.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

fn bearer_token<'r>(request: &'r Request<'_>) -> Option<&'r str> {
    let from_header = request
        .headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if from_header.is_some() {
        return from_header;
    }
    if request.uri().path().ends_with("/events") {
        return request
            .query_value::<&str>(ACCESS_TOKEN_PARAM)
            .and_then(Result::ok)
            .filter(|token| !token.is_empty());
    }
    None
}

/// Verifies the bearer token without touching the database.
fn verified_claims(request: &Request<'_>) -> Result<Claims, Status> {
    let Some(token) = bearer_token(request) else {
        return Err(Status::Unauthorized);
    };
    let Some(tokens) = request.rocket().state::<TokenService>() else {
        error!("TokenService is not in managed state");
        return Err(Status::InternalServerError);
    };
    tokens.verify(token).map_err(|e| {
        warn!("Rejected bearer token on {}: {}", request.uri().path(), e);
        Status::Unauthorized
    })
}

/// A request guard for routes that require a tenant principal.
///
/// Super-admin tokens are authenticated but carry no company, so they are
/// refused here with 403.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The principal's current row.
    pub user: User,
    pub principal: Principal,
}

impl AuthenticatedUser {
    pub fn company_id(&self) -> i32 {
        self.user.company_id
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let claims = match verified_claims(request) {
            Ok(claims) => claims,
            Err(status) => return Outcome::Error((status, ())),
        };
        let (Ok(user_id), Ok(role)) = (claims.principal_id(), claims.role()) else {
            warn!("Token for '{}' carries malformed claims", claims.email);
            return Outcome::Error((Status::Unauthorized, ()));
        };
        let Some(company_id) = claims.company_id else {
            if role == Role::SuperAdmin {
                return Outcome::Error((Status::Forbidden, ()));
            }
            warn!("Token for '{}' has no company", claims.email);
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };
        let user = match db
            .run(move |conn| find_in_company(conn, company_id, user_id))
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Token subject {} no longer exists in company {}", user_id, company_id);
                return Outcome::Error((Status::Unauthorized, ()));
            }
            Err(e) => {
                error!("Database error loading principal {}: {:?}", user_id, e);
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        if user.status() != Some(EmploymentStatus::Active) {
            warn!("Inactive principal {} attempted access", user.id);
            return Outcome::Error((Status::Unauthorized, ()));
        }
        let Some(principal) = user.principal() else {
            error!("User {} has unknown role '{}'", user.id, user.role);
            return Outcome::Error((Status::InternalServerError, ()));
        };

        Outcome::Success(AuthenticatedUser { user, principal })
    }
}

/// Macro to create role-specific request guards
macro_rules! create_role_guard {
    ($(#[$meta:meta])* $name:ident, $allowed:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            pub user: User,
            pub principal: Principal,
        }

        impl $name {
            pub fn company_id(&self) -> i32 {
                self.user.company_id
            }
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                let auth_user = match AuthenticatedUser::from_request(request).await {
                    Outcome::Success(user) => user,
                    Outcome::Error(e) => return Outcome::Error(e),
                    Outcome::Forward(f) => return Outcome::Forward(f),
                };

                let allowed: fn(&Role) -> bool = $allowed;
                if allowed(&auth_user.principal.role) {
                    Outcome::Success($name {
                        user: auth_user.user,
                        principal: auth_user.principal,
                    })
                } else {
                    Outcome::Error((Status::Forbidden, ()))
                }
            }
        }
    };
}

create_role_guard!(
    /// admin or hr_manager.
    HrUser,
    Role::is_hr_level
);

create_role_guard!(
    /// admin, hr_manager or department_manager.
    ManagerUser,
    Role::is_manager_level
);

/// The platform super admin, reloaded from its own table.
#[derive(Debug, Clone)]
pub struct SuperAdminUser {
    pub admin: SuperAdmin,
    pub principal: Principal,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SuperAdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let claims = match verified_claims(request) {
            Ok(claims) => claims,
            Err(status) => return Outcome::Error((status, ())),
        };
        match claims.role() {
            Ok(Role::SuperAdmin) if claims.company_id.is_none() => {}
            Ok(_) => return Outcome::Error((Status::Forbidden, ())),
            Err(e) => {
                warn!("{}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        }
        let Ok(admin_id) = claims.principal_id() else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };
        let found = db
            .run(move |conn| {
                super_admins::table
                    .find(admin_id)
                    .select(SuperAdmin::as_select())
                    .first(conn)
                    .optional()
            })
            .await;

        match found {
            Ok(Some(admin)) => Outcome::Success(SuperAdminUser {
                principal: Principal {
                    id: admin.id,
                    email: admin.email.clone(),
                    role: Role::SuperAdmin,
                    company_id: None,
                    department_id: None,
                },
                admin,
            }),
            Ok(None) => {
                warn!("Super admin {} no longer exists", admin_id);
                Outcome::Error((Status::Unauthorized, ()))
            }
            Err(e) => {
                error!("Database error loading super admin {}: {:?}", admin_id, e);
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}
