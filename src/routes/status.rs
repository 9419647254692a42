//! Status endpoint used by the client to check that the server answers.
//!
//! Independent of the store: it succeeds even while the store is down.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::STATUS_MESSAGE;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    /// RFC 3339 UTC timestamp
    pub time: String,
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: STATUS_MESSAGE.to_string(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_status_is_ok_with_parseable_time() {
        let Json(response) = status().await;
        assert_eq!(response.status, "ok");
        assert_eq!(response.message, STATUS_MESSAGE);

        let time = DateTime::parse_from_rfc3339(&response.time).unwrap();
        assert!((Utc::now() - time.with_timezone(&Utc)).num_seconds().abs() < 5);
        assert!(response.time.ends_with('Z'));
    }
}
