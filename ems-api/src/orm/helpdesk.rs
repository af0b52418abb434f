use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::error::{ApiError, ApiResult};
use crate::identity::Principal;
use crate::models::{
    HelpdeskTicket, NewHelpdeskTicket, NewTicketReply, TicketFields, TicketReply,
    TicketWithReplies, User,
};
use crate::orm::notification;
use crate::orm::user::{ownership_of, visibility_for};
use crate::policy::{self, can_view};
use crate::schema::{helpdesk_tickets, ticket_replies};

pub const TICKET_NOT_FOUND: &str = "Ticket not found in your company.";
pub const TICKET_STATUSES: [&str; 4] = ["open", "in_progress", "resolved", "closed"];

fn find_ticket(conn: &mut SqliteConnection, company_id: i32, ticket_id: i32) -> ApiResult<HelpdeskTicket> {
    helpdesk_tickets::table
        .filter(helpdesk_tickets::company_id.eq(company_id))
        .filter(helpdesk_tickets::id.eq(ticket_id))
        .select(HelpdeskTicket::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| ApiError::not_found(TICKET_NOT_FOUND))
}

/// Tickets raised by anyone the principal may see, newest first.
pub fn list_visible(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
) -> QueryResult<Vec<HelpdeskTicket>> {
    let visibility = visibility_for(conn, principal)?;
    let mut query = helpdesk_tickets::table
        .filter(helpdesk_tickets::company_id.eq(company_id))
        .order((helpdesk_tickets::created_at.desc(), helpdesk_tickets::id.desc()))
        .select(HelpdeskTicket::as_select())
        .into_boxed();
    if let Some(ids) = visibility.owner_ids() {
        query = query.filter(helpdesk_tickets::raised_by_id.eq_any(ids));
    }
    query.load(conn)
}

fn check_access(
    conn: &mut SqliteConnection,
    principal: &Principal,
    ticket: &HelpdeskTicket,
    message: &str,
) -> ApiResult<()> {
    let target = ownership_of(conn, ticket.company_id, ticket.raised_by_id)?;
    policy::require(can_view(principal, &target), message)
}

pub fn get_ticket(
    conn: &mut SqliteConnection,
    principal: &Principal,
    company_id: i32,
    ticket_id: i32,
) -> ApiResult<TicketWithReplies> {
    let ticket = find_ticket(conn, company_id, ticket_id)?;
    check_access(conn, principal, &ticket, "You can only view tickets from your department.")?;
    let replies = TicketReply::belonging_to(&ticket)
        .order((ticket_replies::created_at.asc(), ticket_replies::id.asc()))
        .select(TicketReply::as_select())
        .load(conn)?;
    Ok(TicketWithReplies { ticket, replies })
}

pub fn raise_ticket(
    conn: &mut SqliteConnection,
    raiser: &User,
    fields: TicketFields,
    now: NaiveDateTime,
) -> ApiResult<HelpdeskTicket> {
    let subject = fields.subject.trim();
    if subject.is_empty() {
        return Err(ApiError::validation("Ticket subject is required."));
    }
    conn.immediate_transaction(|conn| {
        diesel::insert_into(helpdesk_tickets::table)
            .values(&NewHelpdeskTicket {
                company_id: raiser.company_id,
                raised_by_id: raiser.id,
                raised_by_name: raiser.full_name(),
                subject: subject.to_string(),
                description: fields.description,
                category: fields.category,
                status: "open".to_string(),
                created_at: now,
            })
            .execute(conn)?;
        notification::record(
            conn,
            raiser.company_id,
            format!("New ticket raised by {}: '{}'.", raiser.first_name, subject),
            now,
        )?;
        Ok(helpdesk_tickets::table
            .filter(helpdesk_tickets::raised_by_id.eq(raiser.id))
            .order(helpdesk_tickets::id.desc())
            .select(HelpdeskTicket::as_select())
            .first(conn)?)
    })
}

pub fn set_status(
    conn: &mut SqliteConnection,
    company_id: i32,
    ticket_id: i32,
    status: &str,
    now: NaiveDateTime,
) -> ApiResult<HelpdeskTicket> {
    let status = status.trim().to_ascii_lowercase();
    if !TICKET_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::validation(format!(
            "Invalid ticket status. Expected one of: {}.",
            TICKET_STATUSES.join(", ")
        )));
    }
    conn.immediate_transaction(|conn| {
        let ticket = find_ticket(conn, company_id, ticket_id)?;
        diesel::update(helpdesk_tickets::table.find(ticket.id))
            .set(helpdesk_tickets::status.eq(&status))
            .execute(conn)?;
        notification::record(
            conn,
            company_id,
            format!(
                "Ticket #{} ('{}') status was updated to {}.",
                ticket.id, ticket.subject, status
            ),
            now,
        )?;
        find_ticket(conn, company_id, ticket.id)
    })
}

/// HR, the raiser, or a manager of the raiser's department may reply.
pub fn add_reply(
    conn: &mut SqliteConnection,
    author: &User,
    author_principal: &Principal,
    ticket_id: i32,
    reply_text: &str,
    now: NaiveDateTime,
) -> ApiResult<TicketReply> {
    if reply_text.trim().is_empty() {
        return Err(ApiError::validation("Reply text is required."));
    }
    conn.immediate_transaction(|conn| {
        let ticket = find_ticket(conn, author.company_id, ticket_id)?;
        check_access(
            conn,
            author_principal,
            &ticket,
            "You do not have permission to reply to this ticket.",
        )?;
        diesel::insert_into(ticket_replies::table)
            .values(&NewTicketReply {
                helpdesk_ticket_id: ticket.id,
                replied_by_id: author.id,
                replied_by_name: author.full_name(),
                reply_text: reply_text.trim().to_string(),
                created_at: now,
            })
            .execute(conn)?;
        notification::record(
            conn,
            author.company_id,
            format!("{} replied to ticket #{}.", author.first_name, ticket.id),
            now,
        )?;
        Ok(ticket_replies::table
            .filter(ticket_replies::helpdesk_ticket_id.eq(ticket.id))
            .order(ticket_replies::id.desc())
            .select(TicketReply::as_select())
            .first(conn)?)
    })
}
