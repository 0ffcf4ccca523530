pub mod handlers;
pub mod middleware;
pub mod reports;
pub mod routes;
pub mod tickets;

pub use routes::create_router;
