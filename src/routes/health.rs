//! Health check endpoint for container orchestration.
//!
//! A liveness probe only: it returns 200 OK whenever the process can answer
//! HTTP and does not consult the store.

pub async fn health() -> &'static str {
    "ok"
}
