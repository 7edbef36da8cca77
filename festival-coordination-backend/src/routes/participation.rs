use http::StatusCode;
use serde::Deserialize;

use super::{json, query, ApiResponse};
use crate::error::AppError;
use crate::listing::{participation_overview, ParticipationRows, Tab};
use crate::FestivalState;

#[derive(Deserialize, Default)]
struct TabQuery {
    #[serde(default)]
    tab: Tab,
}

/// Every kind is loaded whatever the tab, the overall flat count spans all
/// of them.
pub async fn overview(state: &FestivalState, raw_query: Option<&str>) -> Result<ApiResponse, AppError> {
    let TabQuery { tab } = query(raw_query)?;
    let (nominations, bookings, bhog) = tokio::join!(
        state.gateway.get_all_event_nominations(),
        state.gateway.get_all_bookings(),
        state.gateway.get_all_bhog_nominations(),
    );
    let rows = ParticipationRows {
        events: &state.fixtures.events,
        nominations: &nominations,
        bookings: &bookings,
        bhog: &bhog,
    };
    json(StatusCode::OK, &participation_overview(rows, tab))
}
