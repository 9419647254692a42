//! Shared application state for request handlers.

use crate::counter::CounterService;

/// Shared application state, cloneable across handlers.
///
/// Holds no counter data itself; the record lives in the store behind the service.
#[derive(Clone)]
pub struct AppState {
    pub counter: CounterService,
}

impl AppState {
    pub fn new(counter: CounterService) -> Self {
        Self { counter }
    }
}
