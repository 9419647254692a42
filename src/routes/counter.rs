//! Counter read and increment handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterResponse {
    pub value: i64,
}

/// Current counter value, creating the record at 0 if needed
pub async fn read(State(state): State<AppState>) -> Result<Json<CounterResponse>, AppError> {
    let value = state
        .counter
        .read_counter()
        .await
        .map_err(AppError::CounterRead)?;

    Ok(Json(CounterResponse { value }))
}

/// Increment by one and return the post-increment value
pub async fn increment(State(state): State<AppState>) -> Result<Json<CounterResponse>, AppError> {
    let value = state
        .counter
        .increment_counter()
        .await
        .map_err(AppError::CounterIncrement)?;

    tracing::info!(value, "Counter incremented");

    Ok(Json(CounterResponse { value }))
}
