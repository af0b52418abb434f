//! In-process fan-out of change signals to live event-stream clients.
//!
//! Topic signals carry only a tag and go to every subscriber regardless of
//! tenant; clients refetch through the normal read endpoints, which apply
//! tenant and role scoping. Chat messages carry their payload, so the event
//! stream forwards those only to subscribers of the same company.
//!
//! Delivery is best effort: no persistence, no replay, and a slow subscriber
//! that falls behind the channel capacity simply loses older signals.

use serde::Serialize;
use tokio::sync::broadcast;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum Topic {
    AnnouncementUpdated,
    AttendanceUpdated,
    DepartmentUpdated,
    DocumentUpdated,
    EmployeeUpdated,
    HelpdeskUpdated,
    LeaveRequestUpdated,
    NewChatMessage,
    OnboardingUpdated,
    PayrollUpdated,
    PerformanceUpdated,
    SettingsUpdated,
    TaskUpdated,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ChatEvent {
    pub id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub message: String,
    #[serde(with = "crate::timestamps")]
    #[ts(type = "string")]
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    Notification {
        topic: Topic,
    },
    ChatMessage {
        #[serde(skip)]
        company_id: i32,
        #[serde(flatten)]
        message: ChatEvent,
    },
}

impl Signal {
    /// Whether a subscriber from `company_id` should receive this signal.
    pub fn visible_to(&self, company_id: Option<i32>) -> bool {
        match self {
            Signal::Notification { .. } => true,
            Signal::ChatMessage { company_id: owner, .. } => company_id == Some(*owner),
        }
    }
}

pub struct Broadcaster {
    tx: broadcast::Sender<Signal>,
}

impl Broadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, topic: Topic) {
        self.send(Signal::Notification { topic });
    }

    pub fn publish_chat(&self, company_id: i32, message: ChatEvent) {
        self.send(Signal::ChatMessage {
            company_id,
            message,
        });
    }

    fn send(&self, signal: Signal) {
        if let Err(e) = self.tx.send(signal) {
            debug!("Dropped signal with no subscribers: {:?}", e.0);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
