//! Class listing handler

use application::RosterQuery;
use axum::{extract::State, response::Response};
use tracing::instrument;

use super::common::{PrettyJson, with_data_status};
use crate::state::AppState;

/// GET /classes - every distinct class code in the feed
#[instrument(skip(state))]
pub async fn list_classes(State(state): State<AppState>) -> Response {
    let RosterQuery { data, status } = state.roster_service.list_class_codes().await;
    with_data_status(status, PrettyJson(data))
}
