//! Per-class roster handler

use application::RosterQuery;
use axum::{
    extract::{Path, State},
    response::Response,
};
use domain::ClassCode;
use tracing::instrument;

use super::common::{PrettyJson, with_data_status};
use crate::state::AppState;

/// GET /rooster/{class_code} - sessions attended by one class
///
/// An unknown class yields an empty array, not a 404.
#[instrument(skip(state))]
pub async fn get_roster(
    State(state): State<AppState>,
    Path(class_code): Path<String>,
) -> Response {
    let code = ClassCode::new(class_code);
    let RosterQuery { data, status } = state.roster_service.roster_for(&code).await;
    with_data_status(status, PrettyJson(data))
}
