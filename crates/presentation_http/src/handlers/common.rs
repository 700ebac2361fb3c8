//! Shared response helpers for the roster handlers

use application::DataStatus;
use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::ApiError;

/// Header telling clients how current the returned roster data is
pub const ROSTER_STATUS_HEADER: &str = "x-roster-status";

/// JSON body indented with four spaces
#[derive(Debug, Clone)]
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        let mut body = Vec::with_capacity(128);
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"    "));

        match self.0.serialize(&mut serializer) {
            Ok(()) => (
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                )],
                body,
            )
                .into_response(),
            Err(e) => ApiError::Internal(format!("Failed to serialize response: {e}")).into_response(),
        }
    }
}

/// Attach the data status header to a response
pub fn with_data_status(status: DataStatus, body: impl IntoResponse) -> Response {
    ([(ROSTER_STATUS_HEADER, status.as_str())], body).into_response()
}
