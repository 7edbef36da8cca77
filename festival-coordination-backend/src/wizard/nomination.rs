use festival_coordination_database::models::{NewBhogNomination, NewEventNomination};

use super::{expect_step, validate_name, validate_phone, Step, WizardError};
use crate::fixtures::{Building, FestivalEvent, FlatRoster};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NominationKind {
    Event { title: String, date: String },
    Bhog,
}

impl From<&FestivalEvent> for NominationKind {
    fn from(event: &FestivalEvent) -> Self {
        Self::Event {
            title: event.event.clone(),
            date: event.date.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewNomination {
    Event(NewEventNomination),
    Bhog(NewBhogNomination),
}

/// Single-flat nomination. Nothing stops a flat from nominating twice.
pub struct NominationWizard<'a> {
    kind: NominationKind,
    roster: &'a FlatRoster,
    step: Step,
    building: Option<Building>,
    flat: Option<String>,
    user_name: String,
    phone_number: String,
    bhog_item: String,
}

impl<'a> NominationWizard<'a> {
    #[must_use]
    pub const fn new(kind: NominationKind, roster: &'a FlatRoster) -> Self {
        Self {
            kind,
            roster,
            step: Step::Building,
            building: None,
            flat: None,
            user_name: String::new(),
            phone_number: String::new(),
            bhog_item: String::new(),
        }
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    pub fn select_building(&mut self, building: Building) -> Result<(), WizardError> {
        expect_step(self.step, Step::Building)?;
        if self.building != Some(building) {
            self.flat = None;
        }
        self.building = Some(building);
        Ok(())
    }

    #[must_use]
    pub fn flats(&self) -> &[String] {
        self.building
            .map(|building| self.roster.flats(building))
            .unwrap_or_default()
    }

    pub fn select_flat(&mut self, flat: &str) -> Result<(), WizardError> {
        expect_step(self.step, Step::Flat)?;
        let building = self.building.ok_or(WizardError::NoBuildingSelected)?;
        if !self.roster.contains(building, flat) {
            return Err(WizardError::UnknownFlat {
                building: building.to_string(),
                flat: flat.to_owned(),
            });
        }
        self.flat = Some(flat.to_owned());
        Ok(())
    }

    pub fn next(&mut self) -> Result<Step, WizardError> {
        self.step = match self.step {
            Step::Building if self.building.is_none() => {
                return Err(WizardError::NoBuildingSelected)
            }
            Step::Building => Step::Flat,
            Step::Flat if self.flat.is_none() => return Err(WizardError::NoFlatSelected),
            Step::Flat | Step::Details => Step::Details,
        };
        Ok(self.step)
    }

    pub fn back(&mut self) -> Step {
        self.step = self.step.previous();
        self.step
    }

    /// Non-letters are dropped as they are typed.
    pub fn set_user_name(&mut self, input: &str) -> &str {
        self.user_name = super::sanitize_name(input);
        &self.user_name
    }

    pub fn set_phone_number(&mut self, input: &str) {
        input.clone_into(&mut self.phone_number);
    }

    pub fn set_bhog_item(&mut self, input: &str) {
        input.clone_into(&mut self.bhog_item);
    }

    pub fn submit(&self) -> Result<NewNomination, WizardError> {
        expect_step(self.step, Step::Details)?;
        let building = self.building.ok_or(WizardError::NoBuildingSelected)?;
        let flat = self.flat.clone().ok_or(WizardError::NoFlatSelected)?;
        let user_name = validate_name(&self.user_name)?;
        let phone_number = validate_phone(&self.phone_number)?;
        Ok(match &self.kind {
            NominationKind::Event { title, date } => NewNomination::Event(NewEventNomination {
                event_title: title.clone(),
                event_date: date.clone(),
                user_name,
                phone_number,
                building: building.to_string(),
                flat,
            }),
            NominationKind::Bhog => {
                let bhog_item = self.bhog_item.trim();
                if bhog_item.is_empty() {
                    return Err(WizardError::MissingBhogItem);
                }
                NewNomination::Bhog(NewBhogNomination {
                    user_name,
                    phone_number,
                    building: building.to_string(),
                    flat,
                    bhog_item: bhog_item.to_owned(),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> FlatRoster {
        FlatRoster::from_codes(["A101", "A102", "C301"])
    }

    fn event() -> NominationKind {
        NominationKind::Event {
            title: "Rangoli Competition".to_owned(),
            date: "29th August".to_owned(),
        }
    }

    fn at_details<'a>(kind: NominationKind, roster: &'a FlatRoster) -> NominationWizard<'a> {
        let mut wizard = NominationWizard::new(kind, roster);
        wizard.select_building("A".parse().unwrap()).unwrap();
        wizard.next().unwrap();
        wizard.select_flat("A102").unwrap();
        wizard.next().unwrap();
        wizard
    }

    #[test]
    fn event_nomination_requires_ten_digit_phone() {
        let roster = roster();
        let mut wizard = at_details(event(), &roster);
        assert_eq!(wizard.set_user_name("Meera 2"), "Meera ");
        for phone in ["987654321", "98765432101"] {
            wizard.set_phone_number(phone);
            assert_eq!(wizard.submit(), Err(WizardError::InvalidPhone));
        }
        wizard.set_phone_number("9876543210");
        let NewNomination::Event(row) = wizard.submit().unwrap() else {
            panic!("expected an event nomination");
        };
        assert_eq!(row.event_title, "Rangoli Competition");
        assert_eq!(row.user_name, "Meera");
        assert_eq!(row.building, "A");
        assert_eq!(row.flat, "A102");
    }

    #[test]
    fn bhog_nomination_requires_an_item() {
        let roster = roster();
        let mut wizard = at_details(NominationKind::Bhog, &roster);
        wizard.set_user_name("Kiran");
        wizard.set_phone_number("9123456780");
        assert_eq!(wizard.submit(), Err(WizardError::MissingBhogItem));
        wizard.set_bhog_item("  Modak ");
        let NewNomination::Bhog(row) = wizard.submit().unwrap() else {
            panic!("expected a bhog nomination");
        };
        assert_eq!(row.bhog_item, "Modak");
    }

    #[test]
    fn flat_must_belong_to_the_selected_building() {
        let roster = roster();
        let mut wizard = NominationWizard::new(event(), &roster);
        assert_eq!(wizard.next(), Err(WizardError::NoBuildingSelected));
        wizard.select_building("A".parse().unwrap()).unwrap();
        wizard.next().unwrap();
        assert!(matches!(
            wizard.select_flat("C301"),
            Err(WizardError::UnknownFlat { .. })
        ));
        assert_eq!(wizard.next(), Err(WizardError::NoFlatSelected));
        assert_eq!(wizard.flats(), ["A101", "A102"]);
    }

    #[test]
    fn short_names_are_rejected() {
        let roster = roster();
        let mut wizard = at_details(NominationKind::Bhog, &roster);
        wizard.set_user_name("J.");
        wizard.set_phone_number("9123456780");
        wizard.set_bhog_item("Ladoo");
        assert_eq!(wizard.submit(), Err(WizardError::NameTooShort));
    }
}
