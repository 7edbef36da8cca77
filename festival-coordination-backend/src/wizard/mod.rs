//! The sign-up flows: pick building(s), pick flat(s), enter details.

pub mod aarti;
pub mod nomination;

use serde::Serialize;

use crate::fixtures::UnknownBuilding;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Building,
    Flat,
    Details,
}

impl Step {
    const fn previous(self) -> Self {
        match self {
            Self::Building | Self::Flat => Self::Building,
            Self::Details => Self::Flat,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum WizardError {
    #[error("please select at least one building")]
    NoBuildingSelected,
    #[error("please select at least one flat")]
    NoFlatSelected,
    #[error(transparent)]
    UnknownBuilding(#[from] UnknownBuilding),
    #[error("building {building} has no flat {flat}")]
    UnknownFlat { building: String, flat: String },
    #[error("building {0} is not selected")]
    BuildingNotSelected(String),
    #[error("flat {0} is not selected")]
    FlatNotSelected(String),
    #[error("flat {flat} is already booked for {date} ({time})")]
    FlatAlreadyBooked {
        flat: String,
        date: String,
        time: String,
    },
    #[error("{date} ({time}) is not on the aarti calendar")]
    UnknownSlot { date: String, time: String },
    #[error("please enter a name for flat {0}")]
    MissingName(String),
    #[error("name must contain at least 2 letters")]
    NameTooShort,
    #[error("phone number must be exactly 10 digits")]
    InvalidPhone,
    #[error("please enter the bhog item")]
    MissingBhogItem,
    #[error("this action belongs to the {expected:?} step, the wizard is at {actual:?}")]
    WrongStep { expected: Step, actual: Step },
}

pub(crate) fn expect_step(actual: Step, expected: Step) -> Result<(), WizardError> {
    if actual == expected {
        Ok(())
    } else {
        Err(WizardError::WrongStep { expected, actual })
    }
}

/// Drops everything but letters and spaces, the way the name field filters
/// keystrokes.
#[must_use]
pub fn sanitize_name(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphabetic() || *c == ' ')
        .collect()
}

pub fn validate_name(input: &str) -> Result<String, WizardError> {
    let name = sanitize_name(input);
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.chars().filter(|c| c.is_alphabetic()).count() < 2 {
        return Err(WizardError::NameTooShort);
    }
    Ok(name)
}

pub fn validate_phone(input: &str) -> Result<String, WizardError> {
    let phone = input.trim();
    if phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(phone.to_owned())
    } else {
        Err(WizardError::InvalidPhone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_needs_exactly_ten_digits() {
        assert_eq!(validate_phone("9876543210"), Ok("9876543210".to_owned()));
        assert_eq!(validate_phone(" 9876543210 "), Ok("9876543210".to_owned()));
        assert_eq!(validate_phone("987654321"), Err(WizardError::InvalidPhone));
        assert_eq!(validate_phone("98765432101"), Err(WizardError::InvalidPhone));
        assert_eq!(validate_phone("98765-4321"), Err(WizardError::InvalidPhone));
        assert_eq!(validate_phone("९८७६५४३२१०"), Err(WizardError::InvalidPhone));
    }

    #[test]
    fn names_are_stripped_to_letters() {
        assert_eq!(sanitize_name("Asha1 P@til"), "Asha Ptil");
        assert_eq!(validate_name("  Ravi   Kumar "), Ok("Ravi Kumar".to_owned()));
        assert_eq!(validate_name("A1"), Err(WizardError::NameTooShort));
        assert_eq!(validate_name("12"), Err(WizardError::NameTooShort));
        assert_eq!(validate_name("Al"), Ok("Al".to_owned()));
    }

    #[test]
    fn back_never_leaves_the_first_step() {
        assert_eq!(Step::Details.previous(), Step::Flat);
        assert_eq!(Step::Flat.previous(), Step::Building);
        assert_eq!(Step::Building.previous(), Step::Building);
    }
}
