//! Static festival data shipped next to the site: the event list, the flat
//! roster and the aarti calendar. Loaded once at start-up and never written.

use core::fmt::{self, Display};
use core::str::FromStr;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use festival_coordination_database::convert::AartiSlotRef;
use festival_coordination_database::models::NewAartiScheduleSlot;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const EVENTS_FILE: &str = "events.json";
pub const FLATS_FILE: &str = "flats.json";
pub const AARTI_FILE: &str = "aarti.json";

#[derive(thiserror::Error, Debug)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A building code, one of the letters A to H.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Building(char);

pub const BUILDINGS: [Building; 8] = [
    Building('A'),
    Building('B'),
    Building('C'),
    Building('D'),
    Building('E'),
    Building('F'),
    Building('G'),
    Building('H'),
];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown building {0:?}")]
pub struct UnknownBuilding(pub String);

impl Building {
    /// The building a flat code belongs to, i.e. its first character.
    #[must_use]
    pub fn of_flat(flat: &str) -> Option<Self> {
        flat.chars().next().and_then(|c| Self::try_from(c).ok())
    }
}

impl TryFrom<char> for Building {
    type Error = UnknownBuilding;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let upper = value.to_ascii_uppercase();
        if ('A'..='H').contains(&upper) {
            Ok(Self(upper))
        } else {
            Err(UnknownBuilding(value.to_string()))
        }
    }
}

impl FromStr for Building {
    type Err = UnknownBuilding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c),
            _ => Err(UnknownBuilding(s.to_owned())),
        }
    }
}

impl TryFrom<String> for Building {
    type Error = UnknownBuilding;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Building> for String {
    fn from(value: Building) -> Self {
        value.0.to_string()
    }
}

impl Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FestivalEvent {
    pub event: String,
    pub date: String,
    #[serde(default)]
    pub contact: String,
}

impl FestivalEvent {
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.event)
    }
}

/// Lowercases and joins alphanumeric runs with `-`: "56 Bhog!" becomes "56-bhog".
#[must_use]
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlatNumber {
    Number(u32),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlatEntry {
    Code(String),
    Record {
        #[serde(default)]
        id: Option<FlatNumber>,
        number: FlatNumber,
        building: String,
    },
}

// both shapes are in circulation, `{"flats": [...]}` and a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum FlatsFile {
    Wrapped { flats: Vec<FlatEntry> },
    Bare(Vec<FlatEntry>),
}

impl FlatEntry {
    fn into_code(self) -> String {
        match self {
            Self::Code(code) => code.trim().to_owned(),
            Self::Record {
                id: Some(FlatNumber::Text(id)),
                ..
            } if Building::of_flat(id.trim()).is_some() => id.trim().to_ascii_uppercase(),
            Self::Record {
                number: FlatNumber::Number(number),
                building,
                ..
            } => format!("{}{number}", building.trim().to_ascii_uppercase()),
            Self::Record {
                number: FlatNumber::Text(number),
                building,
                ..
            } => format!("{}{}", building.trim().to_ascii_uppercase(), number.trim()),
        }
    }
}

/// Flats grouped by building, each list in roster order.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FlatRoster {
    buildings: BTreeMap<Building, Vec<String>>,
}

impl FlatRoster {
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buildings: BTreeMap<Building, Vec<String>> = BTreeMap::new();
        for code in codes {
            let code = code.into();
            if let Some(building) = Building::of_flat(&code) {
                let flats = buildings.entry(building).or_default();
                if !flats.contains(&code) {
                    flats.push(code);
                }
            } else {
                warn!("skipping flat {code:?} outside of buildings A to H");
            }
        }
        Self { buildings }
    }

    pub fn parse(json: &[u8]) -> Result<Self, serde_json::Error> {
        let entries = match serde_json::from_slice::<FlatsFile>(json)? {
            FlatsFile::Wrapped { flats } | FlatsFile::Bare(flats) => flats,
        };
        Ok(Self::from_codes(entries.into_iter().map(FlatEntry::into_code)))
    }

    #[must_use]
    pub fn flats(&self, building: Building) -> &[String] {
        self.buildings
            .get(&building)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn contains(&self, building: Building, flat: &str) -> bool {
        self.flats(building).iter().any(|candidate| candidate == flat)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buildings.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Default)]
pub struct Fixtures {
    pub events: Vec<FestivalEvent>,
    pub roster: FlatRoster,
    pub calendar: Vec<AartiSlotRef>,
}

async fn read(dir: &Path, name: &str) -> Result<(PathBuf, Vec<u8>), FixtureError> {
    let path = dir.join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok((path, bytes)),
        Err(source) => Err(FixtureError::Read { path, source }),
    }
}

fn parse<T: serde::de::DeserializeOwned>(path: PathBuf, bytes: &[u8]) -> Result<T, FixtureError> {
    serde_json::from_slice(bytes).map_err(|source| FixtureError::Parse { path, source })
}

impl Fixtures {
    pub async fn load(dir: &Path) -> Result<Self, FixtureError> {
        let (path, bytes) = read(dir, EVENTS_FILE).await?;
        let events: Vec<FestivalEvent> = parse(path, &bytes)?;

        let (path, bytes) = read(dir, FLATS_FILE).await?;
        let roster =
            FlatRoster::parse(&bytes).map_err(|source| FixtureError::Parse { path, source })?;

        let (path, bytes) = read(dir, AARTI_FILE).await?;
        let calendar: Vec<AartiSlotRef> = parse(path, &bytes)?;

        info!(
            "loaded {} events, {} flats and {} aarti slots from {}",
            events.len(),
            roster.len(),
            calendar.len(),
            dir.display()
        );
        Ok(Self {
            events,
            roster,
            calendar,
        })
    }

    #[must_use]
    pub fn event_by_slug(&self, slug: &str) -> Option<&FestivalEvent> {
        self.events.iter().find(|event| event.slug() == slug)
    }

    #[must_use]
    pub fn has_slot(&self, slot: &AartiSlotRef) -> bool {
        self.calendar.contains(slot)
    }

    /// Rows for seeding the schedule table.
    #[must_use]
    pub fn schedule_rows(&self) -> Vec<NewAartiScheduleSlot> {
        self.calendar
            .iter()
            .map(|slot| NewAartiScheduleSlot {
                date: slot.date.clone(),
                time: slot.time.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_flat_shapes_build_the_same_roster() {
        let strings = br#"{"flats": ["A101", "A102", "B201", "Z999"]}"#;
        let records = br#"[
            {"id": "A101", "number": 101, "building": "A"},
            {"id": 7, "number": "102", "building": "A"},
            {"number": 201, "building": "B"}
        ]"#;
        let from_strings = FlatRoster::parse(strings).unwrap();
        let from_records = FlatRoster::parse(records).unwrap();
        assert_eq!(from_strings, from_records);
        assert_eq!(from_strings.flats(Building('A')), ["A101", "A102"]);
        assert!(from_strings.flats(Building('H')).is_empty());
        assert_eq!(from_strings.len(), 3);
    }

    #[test]
    fn lowercase_record_buildings_give_uppercase_codes() {
        let records = br#"[
            {"number": 101, "building": "a"},
            {"number": "102", "building": " a "},
            {"id": "b201", "number": 201, "building": "b"}
        ]"#;
        let roster = FlatRoster::parse(records).unwrap();
        assert_eq!(roster.flats(Building('A')), ["A101", "A102"]);
        assert_eq!(roster.flats(Building('B')), ["B201"]);
    }

    #[test]
    fn building_codes_are_limited_to_a_through_h() {
        assert_eq!("c".parse::<Building>(), Ok(Building('C')));
        assert!("I".parse::<Building>().is_err());
        assert!("AB".parse::<Building>().is_err());
        assert_eq!(Building::of_flat("G704"), Some(Building('G')));
        assert_eq!(BUILDINGS.len(), 8);
    }

    #[test]
    fn slugs_join_words_with_dashes() {
        assert_eq!(slugify("Ganesh Sthapana"), "ganesh-sthapana");
        assert_eq!(slugify("  56 Bhog!! "), "56-bhog");
        assert_eq!(slugify("Kids' Drawing Competition"), "kids-drawing-competition");
    }

    #[tokio::test]
    async fn missing_fixture_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let error = Fixtures::load(dir.path()).await.unwrap_err();
        assert!(matches!(error, FixtureError::Read { ref path, .. } if path.ends_with(EVENTS_FILE)));
    }
}
