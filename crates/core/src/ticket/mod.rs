//! Ticket routing subsystem: rule engine plus relational directory store.

mod router;
mod sqlite_store;
mod store;
mod types;

pub use router::TicketRouter;
pub use sqlite_store::SqliteDirectoryStore;
pub use store::{DirectoryStore, NewTicket, TicketError};
pub use types::{
    Company, EnumParseError, Ticket, TicketCategory, TicketStatus, TicketType, TicketView, User,
    UserRole,
};
