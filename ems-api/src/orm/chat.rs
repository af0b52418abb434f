use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::models::{ChatMessage, NewChatMessage, User};
use crate::schema::chat_messages;

pub const HISTORY_LENGTH: i64 = 100;
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// The most recent messages, returned oldest first for display.
pub fn history(conn: &mut SqliteConnection, company_id: i32) -> QueryResult<Vec<ChatMessage>> {
    let mut recent: Vec<ChatMessage> = chat_messages::table
        .filter(chat_messages::company_id.eq(company_id))
        .order((chat_messages::created_at.desc(), chat_messages::id.desc()))
        .limit(HISTORY_LENGTH)
        .select(ChatMessage::as_select())
        .load(conn)?;
    recent.reverse();
    Ok(recent)
}

pub fn post(conn: &mut SqliteConnection, author: &User, message: &str, now: NaiveDateTime) -> ApiResult<ChatMessage> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::validation("Message cannot be empty."));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::validation(format!(
            "Message cannot be longer than {MAX_MESSAGE_CHARS} characters."
        )));
    }
    diesel::insert_into(chat_messages::table)
        .values(&NewChatMessage {
            company_id: author.company_id,
            user_id: author.id,
            user_name: author.full_name(),
            message: message.to_string(),
            created_at: now,
        })
        .execute(conn)?;
    Ok(chat_messages::table
        .filter(chat_messages::user_id.eq(author.id))
        .order(chat_messages::id.desc())
        .select(ChatMessage::as_select())
        .first(conn)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{fixed_now, register_named_company, register_test_company, setup_test_db};
    use chrono::Duration;

    #[test]
    fn history_is_the_latest_hundred_in_order() {
        let mut conn = setup_test_db();
        let (company, admin) = register_test_company(&mut conn);
        for i in 0..105 {
            post(&mut conn, &admin, &format!("m{i}"), fixed_now() + Duration::seconds(i)).unwrap();
        }
        let msgs = history(&mut conn, company.id).unwrap();
        assert_eq!(msgs.len(), 100);
        assert_eq!(msgs[0].message, "m5");
        assert_eq!(msgs[99].message, "m104");
    }

    #[test]
    fn history_is_per_company() {
        let mut conn = setup_test_db();
        let (company, admin) = register_test_company(&mut conn);
        let (other, _) = register_named_company(&mut conn, "Globex", "g@globex.test");
        post(&mut conn, &admin, "hi", fixed_now()).unwrap();
        assert_eq!(history(&mut conn, company.id).unwrap().len(), 1);
        assert!(history(&mut conn, other.id).unwrap().is_empty());
        assert!(post(&mut conn, &admin, "   ", fixed_now()).is_err());
    }
}
