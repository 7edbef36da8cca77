use std::collections::{BTreeMap, BTreeSet};

use festival_coordination_database::convert::{
    convert_booking_to_submission, AartiSlotRef, AartiSubmission,
};
use festival_coordination_database::models::{AartiBooking, NewAartiBooking};
use serde::{Deserialize, Serialize};

use super::{expect_step, Step, WizardError};
use crate::fixtures::{Building, FlatRoster};

/// True iff `existing` already holds a booking for exactly this slot and flat.
#[must_use]
pub fn is_flat_booked(
    existing: &[AartiBooking],
    slot: &AartiSlotRef,
    building: Building,
    flat: &str,
) -> bool {
    let building = building.to_string();
    existing
        .iter()
        .any(|booking| booking.occupies(&slot.date, &slot.time, &building, flat))
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FlatOption {
    pub flat: String,
    pub booked: bool,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlatDetails {
    pub user_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Multi-flat booking of one aarti slot.
///
/// The bookings are a snapshot taken when the wizard opens; a flat booked by
/// somebody else afterwards still shows up as free here.
pub struct AartiWizard<'a> {
    slot: AartiSlotRef,
    roster: &'a FlatRoster,
    existing: &'a [AartiBooking],
    step: Step,
    buildings: BTreeSet<Building>,
    flats: BTreeMap<Building, BTreeSet<String>>,
    details: BTreeMap<String, FlatDetails>,
}

impl<'a> AartiWizard<'a> {
    #[must_use]
    pub const fn open(
        slot: AartiSlotRef,
        roster: &'a FlatRoster,
        existing: &'a [AartiBooking],
    ) -> Self {
        Self {
            slot,
            roster,
            existing,
            step: Step::Building,
            buildings: BTreeSet::new(),
            flats: BTreeMap::new(),
            details: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Returns whether the building is selected afterwards.
    pub fn toggle_building(&mut self, building: Building) -> Result<bool, WizardError> {
        expect_step(self.step, Step::Building)?;
        if self.buildings.remove(&building) {
            if let Some(flats) = self.flats.remove(&building) {
                for flat in flats {
                    self.details.remove(&flat);
                }
            }
            Ok(false)
        } else {
            self.buildings.insert(building);
            Ok(true)
        }
    }

    pub fn selected_buildings(&self) -> impl Iterator<Item = Building> + '_ {
        self.buildings.iter().copied()
    }

    pub fn next(&mut self) -> Result<Step, WizardError> {
        self.step = match self.step {
            Step::Building if self.buildings.is_empty() => {
                return Err(WizardError::NoBuildingSelected)
            }
            Step::Building => Step::Flat,
            Step::Flat if self.flats.values().all(BTreeSet::is_empty) => {
                return Err(WizardError::NoFlatSelected)
            }
            Step::Flat | Step::Details => Step::Details,
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> Step {
        self.step = self.step.previous();
        self.step
    }

    #[must_use]
    pub fn is_booked(&self, building: Building, flat: &str) -> bool {
        is_flat_booked(self.existing, &self.slot, building, flat)
    }

    /// Every flat of the building, booked ones flagged so they render disabled.
    #[must_use]
    pub fn flat_options(&self, building: Building) -> Vec<FlatOption> {
        self.roster
            .flats(building)
            .iter()
            .map(|flat| FlatOption {
                flat: flat.clone(),
                booked: self.is_booked(building, flat),
            })
            .collect()
    }

    pub fn toggle_flat(&mut self, building: Building, flat: &str) -> Result<bool, WizardError> {
        expect_step(self.step, Step::Flat)?;
        if !self.buildings.contains(&building) {
            return Err(WizardError::BuildingNotSelected(building.to_string()));
        }
        if !self.roster.contains(building, flat) {
            return Err(WizardError::UnknownFlat {
                building: building.to_string(),
                flat: flat.to_owned(),
            });
        }
        if self.is_booked(building, flat) {
            return Err(WizardError::FlatAlreadyBooked {
                flat: flat.to_owned(),
                date: self.slot.date.clone(),
                time: self.slot.time.clone(),
            });
        }
        let selected = self.flats.entry(building).or_default();
        if selected.remove(flat) {
            self.details.remove(flat);
            Ok(false)
        } else {
            selected.insert(flat.to_owned());
            Ok(true)
        }
    }

    #[must_use]
    pub fn selected_flats(&self) -> Vec<(Building, String)> {
        self.flats
            .iter()
            .flat_map(|(building, flats)| flats.iter().map(|flat| (*building, flat.clone())))
            .collect()
    }

    pub fn set_details(&mut self, flat: &str, details: FlatDetails) -> Result<(), WizardError> {
        expect_step(self.step, Step::Details)?;
        if !self.flats.values().any(|flats| flats.contains(flat)) {
            return Err(WizardError::FlatNotSelected(flat.to_owned()));
        }
        self.details.insert(flat.to_owned(), details);
        Ok(())
    }

    /// One row per selected flat. Every flat needs a name, the phone number
    /// is optional.
    pub fn submit(&self) -> Result<Vec<NewAartiBooking>, WizardError> {
        expect_step(self.step, Step::Details)?;
        self.selected_flats()
            .into_iter()
            .map(|(building, flat)| {
                let details = self.details.get(&flat).cloned().unwrap_or_default();
                let user_name = details.user_name.trim();
                if user_name.is_empty() {
                    return Err(WizardError::MissingName(flat));
                }
                let phone_number = details
                    .phone_number
                    .map(|phone| phone.trim().to_owned())
                    .filter(|phone| !phone.is_empty());
                Ok(NewAartiBooking {
                    user_name: user_name.to_owned(),
                    phone_number,
                    aarti_date: self.slot.date.clone(),
                    aarti_time: self.slot.time.clone(),
                    building: building.to_string(),
                    flat,
                })
            })
            .collect()
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlatResult {
    pub building: String,
    pub flat: String,
    pub booking: Option<AartiSubmission>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingOutcome {
    /// At least one flat got booked.
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
    pub results: Vec<FlatResult>,
}

impl BookingOutcome {
    pub fn booked(&self) -> impl Iterator<Item = &AartiSubmission> {
        self.results.iter().filter_map(|result| result.booking.as_ref())
    }
}

/// Folds the per-flat inserts into what the booking page reports.
#[must_use]
pub fn summarize(
    slot: &AartiSlotRef,
    attempts: Vec<(NewAartiBooking, Option<AartiBooking>)>,
) -> BookingOutcome {
    let results: Vec<FlatResult> = attempts
        .into_iter()
        .map(|(row, booking)| FlatResult {
            building: row.building,
            flat: row.flat,
            booking: booking.as_ref().map(convert_booking_to_submission),
        })
        .collect();
    let (booked, failed): (Vec<&FlatResult>, Vec<&FlatResult>) =
        results.iter().partition(|result| result.booking.is_some());

    if booked.is_empty() {
        return BookingOutcome {
            success: false,
            message: "Failed to book aarti. Please try again.".to_owned(),
            redirect: None,
            results,
        };
    }

    let names = |list: &[&FlatResult]| {
        list.iter()
            .map(|result| result.flat.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut message = format!(
        "Aarti booked for {} ({}): {}.",
        slot.date,
        slot.time,
        names(&booked)
    );
    if !failed.is_empty() {
        message.push_str(&format!(" Could not book: {}.", names(&failed)));
    }
    BookingOutcome {
        success: true,
        message,
        redirect: Some("/"),
        results,
    }
}
