//! Document metadata. The file bytes live under the configured document
//! directory; only the relative `file_url` is stored here.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::identity::Principal;
use crate::models::{Document, NewDocument};
use crate::orm::user::require_in_company;
use crate::policy::document_owner;
use crate::schema::documents;

pub const DOCUMENT_NOT_FOUND: &str = "Document not found in your company.";

/// HR sees every document in the tenant; everyone else sees their own and
/// the company-wide ones. Newest first.
pub fn list_visible(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
) -> QueryResult<Vec<Document>> {
    let mut query = documents::table
        .filter(documents::company_id.eq(company_id))
        .order((documents::uploaded_at.desc(), documents::id.desc()))
        .select(Document::as_select())
        .into_boxed();
    if !principal.role.is_hr_level() {
        query = query.filter(
            documents::employee_id
                .eq(principal.id)
                .or(documents::employee_id.is_null()),
        );
    }
    query.load(conn)
}

/// Strips any directory components a client put into the name.
pub fn clean_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}

/// `<uuid>_<name>`, unique within the company directory.
pub fn stored_file_name(clean_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), clean_name)
}

pub fn file_url(company_id: i32, stored_name: &str) -> String {
    format!("/documents/{company_id}/{stored_name}")
}

/// Which employee an upload belongs to, checked against the tenant.
pub fn resolve_owner(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    requested: Option<i32>,
) -> ApiResult<Option<i32>> {
    let owner = document_owner(principal, requested);
    if let Some(id) = owner {
        require_in_company(conn, company_id, id)?;
    }
    Ok(owner)
}

pub struct Upload {
    pub employee_id: Option<i32>,
    pub document_name: String,
    pub document_type: String,
    pub file_url: String,
}

pub fn insert_document(
    conn: &mut SqliteConnection,
    uploader: &Principal,
    company_id: i32,
    upload: Upload,
    now: NaiveDateTime,
) -> QueryResult<Document> {
    diesel::insert_into(documents::table)
        .values(&NewDocument {
            company_id,
            employee_id: upload.employee_id,
            uploaded_by_id: uploader.id,
            document_name: upload.document_name,
            document_type: upload.document_type,
            file_url: upload.file_url,
            uploaded_at: now,
        })
        .execute(conn)?;
    documents::table
        .filter(documents::company_id.eq(company_id))
        .order(documents::id.desc())
        .select(Document::as_select())
        .first(conn)
}

/// Removes the row and returns it so the caller can delete the file.
pub fn delete_document(conn: &mut SqliteConnection, company_id: i32, document_id: i32) -> ApiResult<Document> {
    let document = documents::table
        .filter(documents::company_id.eq(company_id))
        .filter(documents::id.eq(document_id))
        .select(Document::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found(DOCUMENT_NOT_FOUND))?;
    diesel::delete(documents::table.find(document.id)).execute(conn)?;
    Ok(document)
}
