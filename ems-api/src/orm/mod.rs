pub mod announcement;
pub mod attendance;
pub mod chat;
pub mod company;
mod db;
pub mod department;
pub mod document;
pub mod helpdesk;
pub mod leave;
pub mod login;
pub mod notification;
pub mod onboarding;
pub mod payroll;
pub mod performance;
pub mod reports;
pub mod settings;
pub mod task;
pub mod testing;
pub mod user;

pub use db::*;

diesel::define_sql_function! {
    /// SQLite `lower()`, for case-insensitive matches on text columns.
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text;
}
