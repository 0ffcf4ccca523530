//! Directory storage trait and error type for the ticket subsystem.

use thiserror::Error;

use crate::ticket::{Company, Ticket, TicketType, TicketView, User, UserRole};

/// Error type for ticket operations.
///
/// Business-rule violations carry their own variants so callers can
/// distinguish them from storage failures; storage failures surfaced to
/// the outside are wrapped into the generic retry-suggesting `Conflict`.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Referenced company does not exist.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// An open ticket of the same type already exists for the company.
    #[error("An open {0} ticket already exists for this company")]
    DuplicateOpen(TicketType),

    /// No user holds an eligible role for this ticket.
    #[error("No eligible {0} found for this company")]
    MissingAssignee(UserRole),

    /// More than one user holds a role that must be unique per company.
    #[error("Multiple {0} candidates found for this company")]
    AmbiguousAssignee(UserRole),

    /// Generic conflict shown in place of an internal failure.
    #[error("The operation could not be completed, please retry")]
    Conflict,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl TicketError {
    /// Returns true for business-rule conflicts (never retried by the core).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            TicketError::DuplicateOpen(_)
                | TicketError::MissingAssignee(_)
                | TicketError::AmbiguousAssignee(_)
                | TicketError::Conflict
        )
    }

    /// Label used for the conflict counter metric.
    pub fn conflict_reason(&self) -> &'static str {
        match self {
            TicketError::DuplicateOpen(_) => "duplicate_open",
            TicketError::MissingAssignee(_) => "missing_assignee",
            TicketError::AmbiguousAssignee(_) => "ambiguous_assignee",
            TicketError::Conflict => "storage",
            _ => "other",
        }
    }
}

/// Fields of a ticket to be inserted; id, status and timestamps are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub ticket_type: TicketType,
    pub company_id: String,
    pub assignee_id: String,
}

/// Trait for the relational directory backing the ticket router.
pub trait DirectoryStore: Send + Sync {
    /// Insert a company (wiring and test seeding).
    fn insert_company(&self, name: &str) -> Result<Company, TicketError>;

    /// Insert a user (wiring and test seeding).
    fn insert_user(
        &self,
        name: &str,
        role: UserRole,
        company_id: &str,
    ) -> Result<User, TicketError>;

    /// Get a company by ID.
    fn find_company(&self, id: &str) -> Result<Option<Company>, TicketError>;

    /// Users of a company holding a role, most-recently-created first.
    fn users_by_role(&self, company_id: &str, role: UserRole) -> Result<Vec<User>, TicketError>;

    /// The company's open ticket of the given type, if any.
    fn open_ticket_of_type(
        &self,
        company_id: &str,
        ticket_type: TicketType,
    ) -> Result<Option<Ticket>, TicketError>;

    /// Insert a new open ticket.
    fn insert_ticket(&self, new: NewTicket) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// All tickets joined with company and assignee identity.
    fn list_tickets(&self) -> Result<Vec<TicketView>, TicketError>;

    /// Set an individual ticket's status to resolved.
    fn resolve_ticket(&self, id: &str) -> Result<Ticket, TicketError>;

    /// Atomic strike-off: verify the company has exactly one director,
    /// insert the new open management ticket assigned to them, and resolve
    /// every other open ticket of the company, all in one transaction.
    /// Any failure rolls the whole sequence back.
    fn strike_off(&self, company_id: &str) -> Result<Ticket, TicketError>;
}
