use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::models::{Announcement, NewAnnouncement, User};
use crate::orm::notification;
use crate::schema::announcements;

pub const BOARD_LENGTH: i64 = 20;

/// The latest announcements, newest first.
pub fn latest(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<Announcement>> {
    announcements::table
        .filter(announcements::company_id.eq(company_id))
        .order((announcements::created_at.desc(), announcements::id.desc()))
        .limit(BOARD_LENGTH)
        .select(Announcement::as_select())
        .load(conn)
}

pub fn post(
    conn: &mut SqliteConnection,
    author: &User,
    content: &str,
    now: NaiveDateTime,
) -> ApiResult<Announcement> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::validation("Announcement content is required."));
    }
    conn.immediate_transaction(|conn| {
        diesel::insert_into(announcements::table)
            .values(&NewAnnouncement {
                company_id: author.company_id,
                content: content.to_string(),
                author_name: author.full_name(),
                created_at: now,
            })
            .execute(conn)?;
        notification::record(
            conn,
            author.company_id,
            format!("{} posted a new announcement.", author.first_name),
            now,
        )?;
        Ok(announcements::table
            .filter(announcements::company_id.eq(author.company_id))
            .order(announcements::id.desc())
            .select(Announcement::as_select())
            .first(conn)?)
    })
}

pub fn remove(
    conn: &mut SqliteConnection,
    company_id: i32,
    announcement_id: i32,
    now: NaiveDateTime,
) -> ApiResult<()> {
    conn.immediate_transaction(|conn| {
        let announcement = announcements::table
            .filter(announcements::company_id.eq(company_id))
            .filter(announcements::id.eq(announcement_id))
            .select(Announcement::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("Announcement not found."))?;
        diesel::delete(announcements::table.find(announcement.id)).execute(conn)?;
        notification::record(
            conn,
            company_id,
            format!("An announcement from {} was deleted.", announcement.author_name),
            now,
        )?;
        Ok(())
    })
}
