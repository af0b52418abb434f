//! Document metadata and raw-body uploads.
//!
//! Files live under `document_dir/<company_id>/<uuid>_<name>`; the database
//! only keeps the metadata and the relative URL.

use std::path::{Path, PathBuf};

use rocket::data::{Data, Limits, ToByteUnit};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::tokio::fs;
use rocket::{Route, State};

use crate::api::MessageResponse;
use crate::auth_guards::{AuthenticatedUser, HrUser};
use crate::broadcaster::{Broadcaster, Topic};
use crate::clock::ClockHandle;
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::Document;
use crate::orm::DbConn;
use crate::orm::document::{
    Upload, clean_file_name, delete_document, file_url, insert_document, list_visible,
    resolve_owner, stored_file_name,
};

fn company_dir(config: &AppConfig, company_id: i32) -> PathBuf {
    Path::new(&config.document_dir).join(company_id.to_string())
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!("Could not remove document file {}: {}", path.display(), e);
    }
}

#[get("/1/documents")]
pub async fn list(db: DbConn, auth: AuthenticatedUser) -> ApiResult<Json<Vec<Document>>> {
    let company_id = auth.company_id();
    Ok(Json(
        db.run(move |conn| list_visible(conn, &auth.principal, company_id))
            .await?,
    ))
}

/// Upload Document endpoint.
///
/// - **URL:** `/api/1/documents/upload?document_type=..&file_name=..&employee_id=..`
/// - **Method:** `POST`
/// - **Authentication:** any tenant user
///
/// The request body is the raw file. HR may upload for any employee or,
/// without `employee_id`, company-wide; everyone else always uploads for
/// themselves. Bodies above the `file` limit are refused.
#[post("/1/documents/upload?<document_type>&<file_name>&<employee_id>", data = "<data>")]
#[allow(clippy::too_many_arguments)]
pub async fn upload(
    db: DbConn,
    auth: AuthenticatedUser,
    clock: &State<ClockHandle>,
    config: &State<AppConfig>,
    bus: &State<Broadcaster>,
    limits: &Limits,
    document_type: &str,
    file_name: &str,
    employee_id: Option<i32>,
    data: Data<'_>,
) -> ApiResult<status::Created<Json<Document>>> {
    let clean_name = clean_file_name(file_name)
        .ok_or_else(|| ApiError::validation("A file name is required."))?;
    let document_type = document_type.trim().to_string();
    if document_type.is_empty() {
        return Err(ApiError::validation("A document type is required."));
    }

    let company_id = auth.company_id();
    let principal = auth.principal;
    let owner_principal = principal.clone();
    let owner = db
        .run(move |conn| resolve_owner(conn, &owner_principal, company_id, employee_id))
        .await?;

    let dir = company_dir(config, company_id);
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::internal(format!("creating {}: {}", dir.display(), e)))?;
    let stored = stored_file_name(&clean_name);
    let path = dir.join(&stored);

    let limit = limits.get("file").unwrap_or(1.mebibytes());
    let written = data
        .open(limit)
        .into_file(&path)
        .await
        .map_err(|e| ApiError::internal(format!("writing {}: {}", path.display(), e)))?;
    if !written.is_complete() {
        remove_quietly(&path).await;
        return Err(ApiError::validation(format!("File is larger than the {limit} limit.")));
    }

    let upload_record = Upload {
        employee_id: owner,
        document_name: clean_name,
        document_type,
        file_url: file_url(company_id, &stored),
    };
    let now = clock.now_utc();
    let inserted = db
        .run(move |conn| insert_document(conn, &principal, company_id, upload_record, now))
        .await;
    let document = match inserted {
        Ok(document) => document,
        Err(e) => {
            remove_quietly(&path).await;
            return Err(e.into());
        }
    };
    info!(
        "Document {} ({} bytes) stored as {}",
        document.id,
        written.n.written,
        path.display()
    );
    bus.publish(Topic::DocumentUpdated);
    Ok(status::Created::new(format!("/api/1/documents/{}", document.id)).body(Json(document)))
}

/// Deletes the metadata, then the stored file if it is still there.
#[delete("/1/documents/<id>")]
pub async fn remove(
    db: DbConn,
    auth: HrUser,
    config: &State<AppConfig>,
    bus: &State<Broadcaster>,
    id: i32,
) -> ApiResult<Json<MessageResponse>> {
    let company_id = auth.company_id();
    let document = db
        .run(move |conn| delete_document(conn, company_id, id))
        .await?;
    if let Some(stored) = document.file_url.rsplit('/').next() {
        let path = company_dir(config, company_id).join(stored);
        if fs::try_exists(&path).await.unwrap_or(false) {
            remove_quietly(&path).await;
        }
    }
    bus.publish(Topic::DocumentUpdated);
    Ok(Json(MessageResponse::new("Document deleted successfully.")))
}

pub fn routes() -> Vec<Route> {
    routes![list, upload, remove]
}
