//! JSON bodies for requests that fail before a handler runs, mostly guard
//! rejections and unmatched routes.

use rocket::Catcher;
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CaughtError {
    pub error: String,
    pub path: String,
    pub status: u16,
}

fn caught(status: Status, req: &Request<'_>, error: &str) -> Json<CaughtError> {
    Json(CaughtError {
        error: error.to_string(),
        path: req.uri().path().to_string(),
        status: status.code,
    })
}

#[catch(401)]
fn unauthorized(req: &Request) -> Json<CaughtError> {
    caught(Status::Unauthorized, req, "Access denied. A valid token is required.")
}

#[catch(403)]
fn forbidden(req: &Request) -> Json<CaughtError> {
    caught(Status::Forbidden, req, "Access denied. Insufficient permissions.")
}

#[catch(404)]
fn not_found(req: &Request) -> Json<CaughtError> {
    caught(Status::NotFound, req, "Not found")
}

#[catch(422)]
fn unprocessable(req: &Request) -> Json<CaughtError> {
    caught(Status::UnprocessableEntity, req, "Request body could not be parsed.")
}

#[catch(500)]
fn internal(req: &Request) -> Json<CaughtError> {
    caught(Status::InternalServerError, req, crate::error::INTERNAL_ERROR_MESSAGE)
}

#[catch(default)]
fn fallback(status: Status, req: &Request) -> Json<CaughtError> {
    caught(status, req, status.reason().unwrap_or("Unknown Error"))
}

pub fn all() -> Vec<Catcher> {
    catchers![unauthorized, forbidden, not_found, unprocessable, internal, fallback]
}
