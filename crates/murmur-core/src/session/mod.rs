//! Chat sessions: domain model, derived-view filters, and the persistent
//! session store.

pub mod filter;
pub mod model;
pub mod store;

pub use filter::{DateRange, SessionFilter};
pub use model::{ChatMessage, MessageDraft, Role, Session, SessionPatch};
pub use store::{SessionStats, SessionStore};
