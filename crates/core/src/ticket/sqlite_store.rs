//! SQLite-backed directory store implementation.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{
    Company, DirectoryStore, EnumParseError, NewTicket, Ticket, TicketError, TicketStatus,
    TicketType, TicketView, User, UserRole,
};

/// SQLite-backed directory store.
pub struct SqliteDirectoryStore {
    conn: Mutex<Connection>,
}

impl SqliteDirectoryStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                role TEXT NOT NULL,
                company_id TEXT NOT NULL REFERENCES companies(id),
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                ticket_type TEXT NOT NULL,
                company_id TEXT NOT NULL REFERENCES companies(id),
                assignee_id TEXT NOT NULL REFERENCES users(id),
                status TEXT NOT NULL,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_company_role ON users(company_id, role);
            CREATE INDEX IF NOT EXISTS idx_tickets_company ON tickets(company_id);
            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    fn parse_enum<T>(idx: usize, value: &str) -> rusqlite::Result<T>
    where
        T: FromStr<Err = EnumParseError>,
    {
        value.parse().map_err(|e: EnumParseError| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    }

    fn parse_timestamp(value: &str) -> DateTime<Utc> {
        // Use now as a fallback; shouldn't happen with valid data
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let role_str: String = row.get(2)?;
        let created_at_str: String = row.get(4)?;

        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            role: Self::parse_enum(2, &role_str)?,
            company_id: row.get(3)?,
            created_at: Self::parse_timestamp(&created_at_str),
        })
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let type_str: String = row.get(1)?;
        let status_str: String = row.get(4)?;
        let category_str: String = row.get(5)?;
        let created_at_str: String = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        Ok(Ticket {
            id: row.get(0)?,
            ticket_type: Self::parse_enum(1, &type_str)?,
            company_id: row.get(2)?,
            assignee_id: row.get(3)?,
            status: Self::parse_enum(4, &status_str)?,
            category: Self::parse_enum(5, &category_str)?,
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn insert_ticket_row(
        conn: &Connection,
        new: &NewTicket,
    ) -> Result<Ticket, rusqlite::Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let category = new.ticket_type.category();

        conn.execute(
            "INSERT INTO tickets (id, ticket_type, company_id, assignee_id, status, category, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                new.ticket_type.as_str(),
                new.company_id,
                new.assignee_id,
                TicketStatus::Open.as_str(),
                category.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;

        Ok(Ticket {
            id,
            ticket_type: new.ticket_type,
            company_id: new.company_id.clone(),
            assignee_id: new.assignee_id.clone(),
            status: TicketStatus::Open,
            category,
            created_at: now,
            updated_at: now,
        })
    }

    fn director_ids(
        conn: &Connection,
        company_id: &str,
    ) -> Result<Vec<String>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT id FROM users WHERE company_id = ? AND role = ? ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(
            params![company_id, UserRole::Director.as_str()],
            |row| row.get::<_, String>(0),
        )?;
        rows.collect()
    }
}

impl DirectoryStore for SqliteDirectoryStore {
    fn insert_company(&self, name: &str) -> Result<Company, TicketError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO companies (id, name, created_at) VALUES (?, ?, ?)",
            params![id, name, now.to_rfc3339()],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Company {
            id,
            name: name.to_string(),
            created_at: now,
        })
    }

    fn insert_user(
        &self,
        name: &str,
        role: UserRole,
        company_id: &str,
    ) -> Result<User, TicketError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO users (id, name, role, company_id, created_at) VALUES (?, ?, ?, ?, ?)",
            params![id, name, role.as_str(), company_id, now.to_rfc3339()],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(User {
            id,
            name: name.to_string(),
            role,
            company_id: company_id.to_string(),
            created_at: now,
        })
    }

    fn find_company(&self, id: &str) -> Result<Option<Company>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, name, created_at FROM companies WHERE id = ?",
            params![id],
            |row| {
                let created_at_str: String = row.get(2)?;
                Ok(Company {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: Self::parse_timestamp(&created_at_str),
                })
            },
        );

        match result {
            Ok(company) => Ok(Some(company)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn users_by_role(&self, company_id: &str, role: UserRole) -> Result<Vec<User>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, name, role, company_id, created_at FROM users WHERE company_id = ? AND role = ? ORDER BY created_at DESC",
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![company_id, role.as_str()], Self::row_to_user)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut users = Vec::new();
        for row_result in rows {
            users.push(row_result.map_err(|e| TicketError::Database(e.to_string()))?);
        }

        Ok(users)
    }

    fn open_ticket_of_type(
        &self,
        company_id: &str,
        ticket_type: TicketType,
    ) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, ticket_type, company_id, assignee_id, status, category, created_at, updated_at FROM tickets WHERE company_id = ? AND ticket_type = ? AND status = ? LIMIT 1",
            params![company_id, ticket_type.as_str(), TicketStatus::Open.as_str()],
            Self::row_to_ticket,
        );

        match result {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn insert_ticket(&self, new: NewTicket) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        Self::insert_ticket_row(&conn, &new).map_err(|e| TicketError::Database(e.to_string()))
    }

    fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, ticket_type, company_id, assignee_id, status, category, created_at, updated_at FROM tickets WHERE id = ?",
            params![id],
            Self::row_to_ticket,
        );

        match result {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }

    fn list_tickets(&self) -> Result<Vec<TicketView>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT t.id, t.ticket_type, t.company_id, t.assignee_id, t.status, t.category, t.created_at, t.updated_at, c.name, u.name \
                 FROM tickets t \
                 JOIN companies c ON c.id = t.company_id \
                 JOIN users u ON u.id = t.assignee_id \
                 ORDER BY t.created_at ASC",
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let ticket = Self::row_to_ticket(row)?;
                let company_name: String = row.get(8)?;
                let assignee_name: String = row.get(9)?;
                Ok(TicketView {
                    ticket,
                    company_name,
                    assignee_name,
                })
            })
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut tickets = Vec::new();
        for row_result in rows {
            tickets.push(row_result.map_err(|e| TicketError::Database(e.to_string()))?);
        }

        Ok(tickets)
    }

    fn resolve_ticket(&self, id: &str) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let current = conn.query_row(
            "SELECT id, ticket_type, company_id, assignee_id, status, category, created_at, updated_at FROM tickets WHERE id = ?",
            params![id],
            Self::row_to_ticket,
        );

        let current_ticket = match current {
            Ok(ticket) => ticket,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(TicketError::NotFound(id.to_string()));
            }
            Err(e) => return Err(TicketError::Database(e.to_string())),
        };

        // Resolving an already-resolved ticket is a no-op
        if current_ticket.status == TicketStatus::Resolved {
            return Ok(current_ticket);
        }

        let now = Utc::now();
        conn.execute(
            "UPDATE tickets SET status = ?, updated_at = ? WHERE id = ?",
            params![TicketStatus::Resolved.as_str(), now.to_rfc3339(), id],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Ticket {
            status: TicketStatus::Resolved,
            updated_at: now,
            ..current_ticket
        })
    }

    fn strike_off(&self, company_id: &str) -> Result<Ticket, TicketError> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn
            .transaction()
            .map_err(|e| TicketError::Database(e.to_string()))?;

        // Dropping the transaction on any early return rolls everything back.
        let directors =
            Self::director_ids(&tx, company_id).map_err(|e| TicketError::Database(e.to_string()))?;

        let assignee_id = match directors.as_slice() {
            [] => return Err(TicketError::MissingAssignee(UserRole::Director)),
            [sole] => sole.clone(),
            _ => return Err(TicketError::AmbiguousAssignee(UserRole::Director)),
        };

        let ticket = Self::insert_ticket_row(
            &tx,
            &NewTicket {
                ticket_type: TicketType::StrikeOff,
                company_id: company_id.to_string(),
                assignee_id,
            },
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        tx.execute(
            "UPDATE tickets SET status = ?, updated_at = ? WHERE company_id = ? AND status = ? AND id != ?",
            params![
                TicketStatus::Resolved.as_str(),
                Utc::now().to_rfc3339(),
                company_id,
                TicketStatus::Open.as_str(),
                ticket.id,
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        tx.commit()
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(ticket)
    }
}
