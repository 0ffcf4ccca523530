//! Ticket API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use opsdesk_core::{Ticket, TicketCategory, TicketError, TicketStatus, TicketType, TicketView};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    /// Business type deciding category and assignee
    pub ticket_type: String,
    /// Company the ticket is raised against
    pub company_id: String,
}

/// Response for ticket operations
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: String,
    pub ticket_type: TicketType,
    pub company_id: String,
    pub assignee_id: String,
    pub status: TicketStatus,
    pub category: TicketCategory,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            ticket_type: ticket.ticket_type,
            company_id: ticket.company_id,
            assignee_id: ticket.assignee_id,
            status: ticket.status,
            category: ticket.category,
            created_at: ticket.created_at.to_rfc3339(),
            updated_at: ticket.updated_at.to_rfc3339(),
        }
    }
}

/// List entry enriched with company and assignee identity
#[derive(Debug, Serialize)]
pub struct TicketViewResponse {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub company_name: String,
    pub assignee_name: String,
}

impl From<TicketView> for TicketViewResponse {
    fn from(view: TicketView) -> Self {
        Self {
            ticket: TicketResponse::from(view.ticket),
            company_name: view.company_name,
            assignee_name: view.assignee_name,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<TicketErrorResponse>) {
    (
        status,
        Json(TicketErrorResponse {
            error: message.into(),
        }),
    )
}

fn map_ticket_error(e: TicketError) -> (StatusCode, Json<TicketErrorResponse>) {
    let status = match &e {
        TicketError::CompanyNotFound(_) | TicketError::NotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_conflict() => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<TicketResponse>), impl IntoResponse> {
    // Boundary validation before the router is called
    let ticket_type: TicketType = match body.ticket_type.parse() {
        Ok(t) => t,
        Err(_) => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                format!(
                    "Unknown ticket type: {} (expected management_report, registration_address_change or strike_off)",
                    body.ticket_type
                ),
            ));
        }
    };

    let company_id = body.company_id.trim();
    if company_id.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "company_id must not be empty",
        ));
    }

    match state.router().create_ticket(ticket_type, company_id) {
        Ok(ticket) => Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket)))),
        Err(e) => Err(map_ticket_error(e)),
    }
}

/// List all tickets, enriched with company and assignee identity.
///
/// An empty list is translated to a not-found condition at this layer.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TicketViewResponse>>, impl IntoResponse> {
    match state.router().list_tickets() {
        Ok(views) if views.is_empty() => {
            Err(error_response(StatusCode::NOT_FOUND, "No tickets found"))
        }
        Ok(views) => Ok(Json(
            views.into_iter().map(TicketViewResponse::from).collect(),
        )),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

/// Resolve an individual ticket
pub async fn resolve_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>, impl IntoResponse> {
    match state.router().resolve_ticket(&id) {
        Ok(ticket) => Ok(Json(TicketResponse::from(ticket))),
        Err(e) => Err(map_ticket_error(e)),
    }
}
