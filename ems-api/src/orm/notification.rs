use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::models::{NewNotification, Notification};
use crate::schema::notifications;

pub const FEED_LENGTH: i64 = 10;

/// Appends a line to the company's activity feed.
pub fn record(
    conn: &mut SqliteConnection,
    company_id: i32,
    message: impl Into<String>,
    now: NaiveDateTime,
) -> QueryResult<()> {
    diesel::insert_into(notifications::table)
        .values(&NewNotification {
            company_id,
            message: message.into(),
            created_at: now,
        })
        .execute(conn)?;
    Ok(())
}

/// The latest entries, newest first.
pub fn latest(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<Notification>> {
    notifications::table
        .filter(notifications::company_id.eq(company_id))
        .order((notifications::created_at.desc(), notifications::id.desc()))
        .limit(FEED_LENGTH)
        .select(Notification::as_select())
        .load(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{fixed_now, register_test_company, setup_test_db};

    #[test]
    fn feed_is_capped_and_newest_first() {
        let mut conn = setup_test_db();
        let (company, _) = register_test_company(&mut conn);
        for i in 0..12 {
            record(&mut conn, company.id, format!("event {i}"), fixed_now() + chrono::Duration::minutes(i))
                .unwrap();
        }
        let feed = latest(&mut conn, company.id).unwrap();
        assert_eq!(feed.len(), 10);
        assert_eq!(feed[0].message, "event 11");
        assert!(latest(&mut conn, company.id + 1).unwrap().is_empty());
    }
}
