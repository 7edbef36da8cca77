use http::StatusCode;

use super::{json, ApiResponse};
use crate::error::AppError;
use crate::FestivalState;

/// Flats keyed by building, `{"A": ["A101", ...], ...}`.
pub fn list(state: &FestivalState) -> Result<ApiResponse, AppError> {
    json(StatusCode::OK, &state.fixtures.roster)
}
