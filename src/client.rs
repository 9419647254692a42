//! API client and the counter view driven by it.
//!
//! `CounterView` mirrors what a front end shows: a status line, the counter
//! value and a single error slot. It never computes the counter itself; it
//! only displays what the server returned. Every failure, whether network or
//! non-2xx, collapses into the same fixed message.

use std::fmt::Write;

use serde::de::DeserializeOwned;

use crate::routes::counter::CounterResponse;
use crate::routes::status::StatusResponse;

/// Status line shown before anything has been loaded
pub const INITIAL_STATUS_TEXT: &str = "(nothing loaded yet)";

/// Counter placeholder while the value is unknown
pub const COUNTER_PLACEHOLDER: &str = "(loading or error)";

/// The one error message shown for any failed request
pub const TRANSPORT_ERROR_MESSAGE: &str = "Could not communicate with the server.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Thin HTTP client for the counter API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn status(&self) -> Result<StatusResponse, ClientError> {
        self.send(self.http.get(self.url("/api/status"))).await
    }

    pub async fn counter(&self) -> Result<CounterResponse, ClientError> {
        self.send(self.http.get(self.url("/api/counter"))).await
    }

    pub async fn increment(&self) -> Result<CounterResponse, ClientError> {
        self.send(self.http.post(self.url("/api/counter/increment")))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

/// What the user sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterView {
    pub status_text: String,
    pub counter: Option<i64>,
    pub error: Option<String>,
}

impl Default for CounterView {
    fn default() -> Self {
        Self {
            status_text: INITIAL_STATUS_TEXT.to_string(),
            counter: None,
            error: None,
        }
    }
}

impl CounterView {
    /// Initial load: status first, then the counter. Stops at the first failure.
    pub async fn load(&mut self, client: &ApiClient) {
        self.error = None;

        if let Err(e) = self.load_inner(client).await {
            tracing::warn!(error = %e, "Initial load failed");
            self.error = Some(TRANSPORT_ERROR_MESSAGE.to_string());
        }
    }

    async fn load_inner(&mut self, client: &ApiClient) -> Result<(), ClientError> {
        let status = client.status().await?;
        self.status_text = format!("{}: {}", status.status, status.message);

        let counter = client.counter().await?;
        self.counter = Some(counter.value);
        Ok(())
    }

    /// Ask the server to increment and show whatever it returns.
    pub async fn increment(&mut self, client: &ApiClient) {
        self.error = None;

        match client.increment().await {
            Ok(response) => self.counter = Some(response.value),
            Err(e) => {
                tracing::warn!(error = %e, "Increment failed");
                self.error = Some(TRANSPORT_ERROR_MESSAGE.to_string());
            }
        }
    }

    pub fn counter_display(&self) -> String {
        match self.counter {
            Some(value) => value.to_string(),
            None => COUNTER_PLACEHOLDER.to_string(),
        }
    }

    /// Plain-text rendering for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Server status: {}", self.status_text);
        let _ = writeln!(out, "Counter: {}", self.counter_display());
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error: {}", error);
        }
        out
    }
}
