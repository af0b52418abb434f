pub mod attendance;
pub mod company;
pub mod department;
pub mod document;
pub mod helpdesk;
pub mod leave;
pub mod messaging;
pub mod onboarding;
pub mod payroll;
pub mod performance;
pub mod settings;
pub mod task;
pub mod user;

// Re-export models for easier access
pub use attendance::*;
pub use company::*;
pub use department::*;
pub use document::*;
pub use helpdesk::*;
pub use leave::*;
pub use messaging::*;
pub use onboarding::*;
pub use payroll::*;
pub use performance::*;
pub use settings::*;
pub use task::*;
pub use user::*;
