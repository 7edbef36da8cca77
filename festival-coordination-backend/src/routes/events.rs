use std::collections::BTreeMap;

use festival_coordination_database::models::EventNomination;
use http::StatusCode;
use serde::Serialize;
use tracing::info;

use super::{json, query, ApiResponse, NominationPayload};
use crate::error::AppError;
use crate::fixtures::FestivalEvent;
use crate::listing::{filter_nominations, get_grouped_event_nominations, get_unique_flats, NominationFilter};
use crate::wizard::nomination::{NewNomination, NominationKind};
use crate::FestivalState;

#[derive(Serialize)]
struct EventView<'a> {
    #[serde(flatten)]
    event: &'a FestivalEvent,
    slug: String,
}

impl<'a> From<&'a FestivalEvent> for EventView<'a> {
    fn from(event: &'a FestivalEvent) -> Self {
        Self {
            slug: event.slug(),
            event,
        }
    }
}

fn find<'a>(state: &'a FestivalState, slug: &str) -> Result<&'a FestivalEvent, AppError> {
    state
        .fixtures
        .event_by_slug(slug)
        .ok_or_else(|| AppError::NotFound(format!("event {slug:?}")))
}

pub fn list(state: &FestivalState) -> Result<ApiResponse, AppError> {
    let events: Vec<EventView<'_>> = state.fixtures.events.iter().map(EventView::from).collect();
    json(StatusCode::OK, &events)
}

pub fn show(state: &FestivalState, slug: &str) -> Result<ApiResponse, AppError> {
    json(StatusCode::OK, &EventView::from(find(state, slug)?))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventNominations<'a> {
    event: EventView<'a>,
    unique_flats: usize,
    nominations: Vec<EventNomination>,
}

pub async fn nominations(state: &FestivalState, slug: &str) -> Result<ApiResponse, AppError> {
    let event = find(state, slug)?;
    let nominations = state.gateway.get_event_nominations(&event.event).await;
    json(
        StatusCode::OK,
        &EventNominations {
            event: event.into(),
            unique_flats: get_unique_flats(
                nominations
                    .iter()
                    .map(|row| (row.building.as_str(), row.flat.as_str())),
            ),
            nominations,
        },
    )
}

pub async fn nominate(
    state: &FestivalState,
    slug: &str,
    payload: &NominationPayload,
) -> Result<ApiResponse, AppError> {
    let event = find(state, slug)?;
    let NewNomination::Event(row) =
        super::nominate(NominationKind::from(event), &state.fixtures.roster, payload)?
    else {
        return Err(AppError::NotSaved("nomination"));
    };
    let nomination = state
        .gateway
        .create_event_nomination(&row)
        .await
        .ok_or(AppError::NotSaved("nomination"))?;
    info!("{} nominated flat {} for {}", nomination.user_name, nomination.flat, nomination.event_title);
    json(StatusCode::CREATED, &nomination)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NominationListing<'a> {
    total: usize,
    unique_flats: usize,
    groups: BTreeMap<String, Vec<&'a EventNomination>>,
}

pub async fn all_nominations(state: &FestivalState, raw_query: Option<&str>) -> Result<ApiResponse, AppError> {
    let filter: NominationFilter = query(raw_query)?;
    let all = state.gateway.get_all_event_nominations().await;
    let filtered = filter_nominations(&all, &filter);
    json(
        StatusCode::OK,
        &NominationListing {
            total: filtered.len(),
            unique_flats: get_unique_flats(
                filtered
                    .iter()
                    .map(|row| (row.building.as_str(), row.flat.as_str())),
            ),
            groups: get_grouped_event_nominations(filtered.iter().copied()),
        },
    )
}
