//! Core ticket routing data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a persisted enum value cannot be parsed back.
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct EnumParseError {
    pub kind: &'static str,
    pub value: String,
}

// ============================================================================
// Ticket enums
// ============================================================================

/// Business type of a ticket, determining its routing rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    ManagementReport,
    RegistrationAddressChange,
    StrikeOff,
}

impl TicketType {
    /// Returns the type as a string (persisted form and wire name).
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::ManagementReport => "management_report",
            TicketType::RegistrationAddressChange => "registration_address_change",
            TicketType::StrikeOff => "strike_off",
        }
    }

    /// Category this ticket type is filed under.
    pub fn category(&self) -> TicketCategory {
        match self {
            TicketType::ManagementReport => TicketCategory::Accounting,
            TicketType::RegistrationAddressChange => TicketCategory::Corporate,
            TicketType::StrikeOff => TicketCategory::Management,
        }
    }

    /// Role queried first when resolving an assignee.
    pub fn candidate_role(&self) -> UserRole {
        match self {
            TicketType::ManagementReport => UserRole::Accountant,
            TicketType::RegistrationAddressChange => UserRole::CorporateSecretary,
            TicketType::StrikeOff => UserRole::Director,
        }
    }

    /// Role tried when no user holds the candidate role.
    pub fn fallback_role(&self) -> Option<UserRole> {
        match self {
            TicketType::RegistrationAddressChange => Some(UserRole::Director),
            _ => None,
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "management_report" => Ok(TicketType::ManagementReport),
            "registration_address_change" => Ok(TicketType::RegistrationAddressChange),
            "strike_off" => Ok(TicketType::StrikeOff),
            other => Err(EnumParseError {
                kind: "ticket type",
                value: other.to_string(),
            }),
        }
    }
}

/// Category a ticket is filed under, derived from its type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    Accounting,
    Corporate,
    Management,
}

impl TicketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Accounting => "accounting",
            TicketCategory::Corporate => "corporate",
            TicketCategory::Management => "management",
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketCategory {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accounting" => Ok(TicketCategory::Accounting),
            "corporate" => Ok(TicketCategory::Corporate),
            "management" => Ok(TicketCategory::Management),
            other => Err(EnumParseError {
                kind: "ticket category",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TicketStatus::Open),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(EnumParseError {
                kind: "ticket status",
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// User and company types
// ============================================================================

/// Role a user holds within their company.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Director,
    Accountant,
    CorporateSecretary,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Director => "director",
            UserRole::Accountant => "accountant",
            UserRole::CorporateSecretary => "corporate_secretary",
        }
    }

    /// Returns true for roles a company may hold at most one of.
    ///
    /// Multiple holders of a unique role is an error state for assignee
    /// resolution, never an arbitrary pick.
    pub fn is_unique_per_company(&self) -> bool {
        matches!(self, UserRole::Director | UserRole::CorporateSecretary)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "director" => Ok(UserRole::Director),
            "accountant" => Ok(UserRole::Accountant),
            "corporate_secretary" => Ok(UserRole::CorporateSecretary),
            other => Err(EnumParseError {
                kind: "user role",
                value: other.to_string(),
            }),
        }
    }
}

/// A user of a company, read-only from the router's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier (UUID).
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub company_id: String,
    /// Ordering key when multiple otherwise-valid candidates exist.
    pub created_at: DateTime<Utc>,
}

/// A company, referenced by tickets and users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    /// Unique identifier (UUID).
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Ticket types
// ============================================================================

/// A unit of work requested against a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Unique identifier (UUID), assigned by the store.
    pub id: String,
    pub ticket_type: TicketType,
    pub company_id: String,
    pub assignee_id: String,
    pub status: TicketStatus,
    pub category: TicketCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ticket enriched with company and assignee identity for presentation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub company_name: String,
    pub assignee_name: String,
}
