use festival_coordination_database::models::BhogNomination;
use http::StatusCode;
use serde::Serialize;
use tracing::info;

use super::{json, query, ApiResponse, NominationPayload};
use crate::error::AppError;
use crate::listing::{bhog_summary, filter_bhog, BhogFilter, BhogSummary};
use crate::wizard::nomination::{NewNomination, NominationKind};
use crate::FestivalState;

#[derive(Serialize)]
struct BhogListing<'a> {
    nominations: Vec<&'a BhogNomination>,
    summary: BhogSummary,
}

pub async fn list(state: &FestivalState, raw_query: Option<&str>) -> Result<ApiResponse, AppError> {
    let filter: BhogFilter = query(raw_query)?;
    let rows = state.gateway.get_all_bhog_nominations().await;
    let nominations = filter_bhog(&rows, &filter);
    let summary = bhog_summary(&nominations);
    json(
        StatusCode::OK,
        &BhogListing {
            nominations,
            summary,
        },
    )
}

pub async fn nominate(
    state: &FestivalState,
    payload: &NominationPayload,
) -> Result<ApiResponse, AppError> {
    let NewNomination::Bhog(row) =
        super::nominate(NominationKind::Bhog, &state.fixtures.roster, payload)?
    else {
        return Err(AppError::NotSaved("bhog nomination"));
    };
    let nomination = state
        .gateway
        .create_bhog_nomination(&row)
        .await
        .ok_or(AppError::NotSaved("bhog nomination"))?;
    info!("flat {} offers {} as bhog", nomination.flat, nomination.bhog_item);
    json(StatusCode::CREATED, &nomination)
}
