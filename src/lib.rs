//! tally - a persisted counter service
//!
//! An HTTP service exposing a status check and a single counter backed by a
//! store (Redis, or an in-process single-writer store), plus a small client
//! that drives the API the way the web front end does.

pub mod client;
pub mod config;
pub mod counter;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use counter::CounterService;
pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
