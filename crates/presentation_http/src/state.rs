//! Application state shared across handlers

use std::sync::Arc;

use application::RosterService;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Roster queries over the current feed snapshot
    pub roster_service: Arc<RosterService>,
}

impl AppState {
    pub fn new(roster_service: RosterService) -> Self {
        Self {
            roster_service: Arc::new(roster_service),
        }
    }
}
