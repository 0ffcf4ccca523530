pub mod cache;
pub mod config;
pub mod metrics;
pub mod report;
pub mod ticket;

pub use cache::{Cache, MemoryCache};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    ReportsConfig, SanitizedConfig, ServerConfig,
};
pub use report::{
    ReportError, ReportKind, ReportMetrics, ReportPipeline, ReportStatus, ReportTracker,
    RunDurations, StatusSnapshot,
};
pub use ticket::{
    Company, DirectoryStore, NewTicket, SqliteDirectoryStore, Ticket, TicketCategory, TicketError,
    TicketRouter, TicketStatus, TicketType, TicketView, User, UserRole,
};
