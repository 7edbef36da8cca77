use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use festival_coordination_database::convert::{
    convert_booking_to_submission, AartiSlotRef, AartiSubmission,
};
use festival_coordination_database::models::{AartiBooking, NewAartiBooking};
use futures_util::future::join_all;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{json, query, ApiResponse};
use crate::error::AppError;
use crate::fixtures::{Building, FlatRoster, BUILDINGS};
use crate::listing::slot_statuses;
use crate::wizard::aarti::{summarize, AartiWizard, FlatDetails, FlatOption};
use crate::wizard::WizardError;
use crate::FestivalState;

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FlatChoice {
    pub building: String,
    pub flat: String,
    pub user_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub aarti_schedule: AartiSlotRef,
    pub flats: Vec<FlatChoice>,
}

fn ensure_on_calendar(state: &FestivalState, slot: &AartiSlotRef) -> Result<(), WizardError> {
    if state.fixtures.has_slot(slot) {
        Ok(())
    } else {
        Err(WizardError::UnknownSlot {
            date: slot.date.clone(),
            time: slot.time.clone(),
        })
    }
}

/// Runs the booking wizard over the bookings snapshot with the flats the
/// form collected. A flat listed twice keeps its last details.
pub fn plan_bookings(
    slot: &AartiSlotRef,
    roster: &FlatRoster,
    existing: &[AartiBooking],
    choices: &[FlatChoice],
) -> Result<Vec<NewAartiBooking>, WizardError> {
    let mut chosen: BTreeMap<(Building, String), &FlatChoice> = BTreeMap::new();
    for choice in choices {
        chosen.insert((choice.building.parse()?, choice.flat.trim().to_owned()), choice);
    }

    let mut wizard = AartiWizard::open(slot.clone(), roster, existing);
    let buildings: BTreeSet<Building> = chosen.keys().map(|(building, _)| *building).collect();
    for building in buildings {
        wizard.toggle_building(building)?;
    }
    wizard.next()?;
    for (building, flat) in chosen.keys() {
        wizard.toggle_flat(*building, flat)?;
    }
    wizard.next()?;
    for ((_, flat), choice) in &chosen {
        wizard.set_details(
            flat,
            FlatDetails {
                user_name: choice.user_name.clone(),
                phone_number: choice.phone_number.clone(),
            },
        )?;
    }
    wizard.submit()
}

pub async fn schedule(state: &FestivalState) -> Result<ApiResponse, AppError> {
    let bookings = state.gateway.get_all_bookings().await;
    json(
        StatusCode::OK,
        &slot_statuses(&state.fixtures.calendar, &bookings),
    )
}

pub async fn bookings(state: &FestivalState) -> Result<ApiResponse, AppError> {
    let submissions: Vec<AartiSubmission> = state
        .gateway
        .get_all_bookings()
        .await
        .iter()
        .map(convert_booking_to_submission)
        .collect();
    json(StatusCode::OK, &submissions)
}

#[derive(Deserialize)]
struct AvailabilityQuery {
    date: String,
    time: String,
    /// Comma separated building codes, all eight buildings when absent.
    #[serde(default)]
    buildings: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Availability {
    aarti_schedule: AartiSlotRef,
    buildings: BTreeMap<Building, Vec<FlatOption>>,
}

pub async fn availability(state: &FestivalState, raw_query: Option<&str>) -> Result<ApiResponse, AppError> {
    let AvailabilityQuery {
        date,
        time,
        buildings,
    } = query(raw_query)?;
    let slot = AartiSlotRef { date, time };
    ensure_on_calendar(state, &slot)?;

    let buildings: Vec<Building> = match buildings.as_deref().map(str::trim) {
        Some(list) if !list.is_empty() => list
            .split(',')
            .map(str::parse::<Building>)
            .collect::<Result<_, _>>()?,
        _ => BUILDINGS.to_vec(),
    };

    let existing = state.gateway.get_all_bookings().await;
    let wizard = AartiWizard::open(slot.clone(), &state.fixtures.roster, &existing);
    let options = buildings
        .into_iter()
        .map(|building| (building, wizard.flat_options(building)))
        .collect();
    json(
        StatusCode::OK,
        &Availability {
            aarti_schedule: slot,
            buildings: options,
        },
    )
}

pub async fn book(state: &FestivalState, request: BookingRequest) -> Result<ApiResponse, AppError> {
    let slot = request.aarti_schedule;
    ensure_on_calendar(state, &slot)?;

    let existing = state.gateway.get_all_bookings().await;
    let rows = plan_bookings(&slot, &state.fixtures.roster, &existing, &request.flats)?;

    let inserted = join_all(rows.iter().map(|row| state.gateway.create_booking(row))).await;
    if inserted.iter().any(Option::is_some)
        && !state.gateway.mark_slot_booked(&slot.date, &slot.time).await
    {
        warn!("no schedule row for {} ({}) to mark as booked", slot.date, slot.time);
    }

    let outcome = summarize(&slot, rows.into_iter().zip(inserted).collect());
    info!("{}", outcome.message);

    if state.notifier.is_enabled() {
        let booked: Vec<AartiSubmission> = outcome.booked().cloned().collect();
        let notifier = Arc::clone(&state.notifier);
        tokio::spawn(async move {
            notifier.notify_bookings(&booked).await;
        });
    }

    let status = if outcome.success {
        StatusCode::CREATED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    json(status, &outcome)
}
