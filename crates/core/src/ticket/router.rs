//! Rule engine deciding a new ticket's category and assignee.

use std::sync::Arc;

use tracing::error;

use crate::metrics::{TICKETS_CREATED, TICKET_CONFLICTS};

use super::{DirectoryStore, NewTicket, Ticket, TicketError, TicketType, TicketView, User};

/// Applies the business routing rules on top of a directory store.
///
/// Routing is dispatched on the ticket type: the category is fixed per
/// type, the assignee is resolved from the company's users by role (with
/// an optional fallback role), and a strike-off additionally resolves
/// every other open ticket of the company inside one transaction.
pub struct TicketRouter {
    store: Arc<dyn DirectoryStore>,
}

impl TicketRouter {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    /// Create a ticket of the given type for a company.
    pub fn create_ticket(
        &self,
        ticket_type: TicketType,
        company_id: &str,
    ) -> Result<Ticket, TicketError> {
        let result = self.route(ticket_type, company_id);

        match &result {
            Ok(_) => {
                TICKETS_CREATED
                    .with_label_values(&[ticket_type.as_str()])
                    .inc();
            }
            Err(e) if e.is_conflict() => {
                TICKET_CONFLICTS
                    .with_label_values(&[e.conflict_reason()])
                    .inc();
            }
            Err(_) => {}
        }

        result
    }

    fn route(&self, ticket_type: TicketType, company_id: &str) -> Result<Ticket, TicketError> {
        match self.store.find_company(company_id) {
            Ok(Some(_)) => {}
            Ok(None) => return Err(TicketError::CompanyNotFound(company_id.to_string())),
            Err(e) => return Err(Self::wrap_storage(e)),
        }

        match ticket_type {
            TicketType::ManagementReport => {
                let assignee = self.resolve_assignee(company_id, ticket_type)?;
                self.insert(ticket_type, company_id, &assignee)
            }
            TicketType::RegistrationAddressChange => {
                let duplicate = self
                    .store
                    .open_ticket_of_type(company_id, ticket_type)
                    .map_err(Self::wrap_storage)?;
                if duplicate.is_some() {
                    return Err(TicketError::DuplicateOpen(ticket_type));
                }

                let assignee = self.resolve_assignee(company_id, ticket_type)?;
                self.insert(ticket_type, company_id, &assignee)
            }
            TicketType::StrikeOff => match self.store.strike_off(company_id) {
                Ok(ticket) => Ok(ticket),
                Err(e @ (TicketError::MissingAssignee(_) | TicketError::AmbiguousAssignee(_))) => {
                    Err(e)
                }
                Err(e) => Err(Self::wrap_storage(e)),
            },
        }
    }

    /// All tickets, enriched with company and assignee identity.
    ///
    /// An empty result is a valid outcome at this layer.
    pub fn list_tickets(&self) -> Result<Vec<TicketView>, TicketError> {
        self.store.list_tickets()
    }

    /// Resolve an individual ticket.
    pub fn resolve_ticket(&self, id: &str) -> Result<Ticket, TicketError> {
        self.store.resolve_ticket(id)
    }

    /// Resolve the assignee for role-driven ticket types.
    ///
    /// Candidates are queried most-recently-created first; an empty result
    /// falls through to the type's fallback role. A resolved unique role
    /// with more than one holder is a hard conflict.
    fn resolve_assignee(
        &self,
        company_id: &str,
        ticket_type: TicketType,
    ) -> Result<User, TicketError> {
        let mut role = ticket_type.candidate_role();
        let mut candidates = self
            .store
            .users_by_role(company_id, role)
            .map_err(Self::wrap_storage)?;

        if candidates.is_empty() {
            if let Some(fallback) = ticket_type.fallback_role() {
                role = fallback;
                candidates = self
                    .store
                    .users_by_role(company_id, role)
                    .map_err(Self::wrap_storage)?;
            }
        }

        if candidates.is_empty() {
            return Err(TicketError::MissingAssignee(role));
        }

        if role.is_unique_per_company() && candidates.len() > 1 {
            return Err(TicketError::AmbiguousAssignee(role));
        }

        Ok(candidates.remove(0))
    }

    fn insert(
        &self,
        ticket_type: TicketType,
        company_id: &str,
        assignee: &User,
    ) -> Result<Ticket, TicketError> {
        self.store
            .insert_ticket(NewTicket {
                ticket_type,
                company_id: company_id.to_string(),
                assignee_id: assignee.id.clone(),
            })
            .map_err(Self::wrap_storage)
    }

    /// Log the original cause, hand the caller the generic retryable conflict.
    fn wrap_storage(err: TicketError) -> TicketError {
        match err {
            e @ (TicketError::Database(_) | TicketError::Conflict) => {
                error!("ticket storage failure: {}", e);
                TicketError::Conflict
            }
            other => other,
        }
    }
}
