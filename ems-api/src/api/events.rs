//! Server-sent event stream of refresh signals.
//!
//! Browsers' `EventSource` cannot set headers, so this route also accepts
//! the token as `?access_token=`.

use rocket::response::stream::{Event, EventStream};
use rocket::tokio::select;
use rocket::tokio::sync::broadcast::error::RecvError;
use rocket::{Route, Shutdown, State};

use crate::auth_guards::AuthenticatedUser;
use crate::broadcaster::Broadcaster;

/// Every topic signal, plus chat messages of the caller's company.
#[get("/1/events")]
pub fn stream(auth: AuthenticatedUser, bus: &State<Broadcaster>, mut shutdown: Shutdown) -> EventStream![] {
    let company_id = auth.company_id();
    let user_id = auth.user.id;
    let mut rx = bus.subscribe();
    debug!("User {} subscribed to events", user_id);
    EventStream! {
        loop {
            let signal = select! {
                received = rx.recv() => match received {
                    Ok(signal) => signal,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Event subscriber {} lagged, skipped {} signals", user_id, skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = &mut shutdown => break,
            };
            if signal.visible_to(Some(company_id)) {
                yield Event::json(&signal);
            }
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![stream]
}
