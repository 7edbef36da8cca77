//! Filters, groupings and counts behind the listing pages. Everything works
//! on the handful of rows loaded for one request.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use festival_coordination_database::convert::AartiSlotRef;
use festival_coordination_database::models::{AartiBooking, BhogNomination, EventNomination};
use serde::{Deserialize, Serialize};

use crate::fixtures::FestivalEvent;

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty() && *value != "all")
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct NominationFilter {
    pub search: Option<String>,
    pub building: Option<String>,
    pub event: Option<String>,
    pub date: Option<String>,
}

impl NominationFilter {
    #[must_use]
    pub fn matches(&self, nomination: &EventNomination) -> bool {
        let search = normalized(self.search.as_deref()).map(str::to_lowercase);
        search.map_or(true, |search| {
            contains_ignore_case(&nomination.user_name, &search)
                || contains_ignore_case(&nomination.flat, &search)
                || contains_ignore_case(&nomination.event_title, &search)
        }) && normalized(self.building.as_deref())
            .map_or(true, |building| nomination.building.eq_ignore_ascii_case(building))
            && normalized(self.event.as_deref()).map_or(true, |event| nomination.event_title == event)
            && normalized(self.date.as_deref()).map_or(true, |date| nomination.event_date == date)
    }
}

#[must_use]
pub fn filter_nominations<'a>(
    nominations: &'a [EventNomination],
    filter: &NominationFilter,
) -> Vec<&'a EventNomination> {
    nominations
        .iter()
        .filter(|nomination| filter.matches(nomination))
        .collect()
}

/// Partitions the rows by event title; every row lands in exactly one group.
#[must_use]
pub fn get_grouped_event_nominations<'a, I>(nominations: I) -> BTreeMap<String, Vec<&'a EventNomination>>
where
    I: IntoIterator<Item = &'a EventNomination>,
{
    nominations
        .into_iter()
        .fold(BTreeMap::new(), |mut groups, nomination| {
            groups
                .entry(nomination.event_title.clone())
                .or_insert_with(Vec::new)
                .push(nomination);
            groups
        })
}

/// Number of distinct (building, flat) pairs.
#[must_use]
pub fn get_unique_flats<'a, I>(pairs: I) -> usize
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(building, flat)| format!("{building}-{flat}"))
        .collect::<HashSet<_>>()
        .len()
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct BhogFilter {
    pub search: Option<String>,
    pub building: Option<String>,
}

impl BhogFilter {
    #[must_use]
    pub fn matches(&self, nomination: &BhogNomination) -> bool {
        let search = normalized(self.search.as_deref()).map(str::to_lowercase);
        search.map_or(true, |search| {
            contains_ignore_case(&nomination.user_name, &search)
                || contains_ignore_case(&nomination.flat, &search)
                || contains_ignore_case(&nomination.bhog_item, &search)
        }) && normalized(self.building.as_deref())
            .map_or(true, |building| nomination.building.eq_ignore_ascii_case(building))
    }
}

#[must_use]
pub fn filter_bhog<'a>(rows: &'a [BhogNomination], filter: &BhogFilter) -> Vec<&'a BhogNomination> {
    rows.iter().filter(|row| filter.matches(row)).collect()
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BhogSummary {
    pub total: usize,
    pub unique_flats: usize,
    pub distinct_items: usize,
    pub by_building: BTreeMap<String, usize>,
}

#[must_use]
pub fn bhog_summary(rows: &[&BhogNomination]) -> BhogSummary {
    let mut by_building = BTreeMap::new();
    for row in rows {
        *by_building.entry(row.building.clone()).or_insert(0) += 1;
    }
    BhogSummary {
        total: rows.len(),
        unique_flats: get_unique_flats(rows.iter().map(|row| (row.building.as_str(), row.flat.as_str()))),
        distinct_items: rows
            .iter()
            .map(|row| row.bhog_item.trim().to_lowercase())
            .collect::<HashSet<_>>()
            .len(),
        by_building,
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotStatus {
    pub date: String,
    pub time: String,
    pub booked: bool,
    pub booked_flats: Vec<String>,
}

/// The calendar with its booked state recomputed from the bookings.
#[must_use]
pub fn slot_statuses(calendar: &[AartiSlotRef], bookings: &[AartiBooking]) -> Vec<SlotStatus> {
    calendar
        .iter()
        .map(|slot| {
            let booked_flats: Vec<String> = bookings
                .iter()
                .filter(|booking| booking.aarti_date == slot.date && booking.aarti_time == slot.time)
                .map(|booking| booking.flat.clone())
                .collect();
            SlotStatus {
                date: slot.date.clone(),
                time: slot.time.clone(),
                booked: !booked_flats.is_empty(),
                booked_flats,
            }
        })
        .collect()
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    Events,
    Aarti,
    Bhog,
}

impl Tab {
    #[must_use]
    pub fn shows(self, other: Self) -> bool {
        self == Self::All || self == other
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipation {
    pub event_title: String,
    pub event_date: String,
    pub nominations: usize,
    pub unique_flats: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotParticipation {
    pub date: String,
    pub time: String,
    pub bookings: usize,
    pub flats: Vec<String>,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildingParticipation {
    pub nominations: usize,
    pub aarti_bookings: usize,
    pub bhog_nominations: usize,
    pub unique_flats: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationOverview {
    pub total_unique_flats: usize,
    pub buildings: BTreeMap<String, BuildingParticipation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventParticipation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aarti: Option<Vec<SlotParticipation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bhog: Option<BhogSummary>,
}

/// Per-event counts in fixture order; nominations for titles missing from
/// the fixtures are appended after them.
#[must_use]
pub fn event_participation(
    events: &[FestivalEvent],
    nominations: &[EventNomination],
) -> Vec<EventParticipation> {
    let mut groups = get_grouped_event_nominations(nominations);
    let summarize = |title: &str, date: &str, rows: &[&EventNomination]| EventParticipation {
        event_title: title.to_owned(),
        event_date: date.to_owned(),
        nominations: rows.len(),
        unique_flats: get_unique_flats(rows.iter().map(|row| (row.building.as_str(), row.flat.as_str()))),
    };
    let mut result: Vec<EventParticipation> = events
        .iter()
        .map(|event| {
            let rows = groups.remove(&event.event).unwrap_or_default();
            summarize(&event.event, &event.date, &rows)
        })
        .collect();
    result.extend(groups.into_iter().map(|(title, rows)| {
        let date = rows.first().map(|row| row.event_date.clone()).unwrap_or_default();
        summarize(&title, &date, &rows)
    }));
    result
}

#[must_use]
pub fn aarti_participation(bookings: &[AartiBooking]) -> Vec<SlotParticipation> {
    let mut slots: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for booking in bookings {
        slots
            .entry((booking.aarti_date.clone(), booking.aarti_time.clone()))
            .or_default()
            .push(booking.flat.clone());
    }
    slots
        .into_iter()
        .map(|((date, time), mut flats)| {
            flats.sort();
            SlotParticipation {
                date,
                time,
                bookings: flats.len(),
                flats,
            }
        })
        .collect()
}

/// Rows the overview is computed from. Kinds outside the selected tab may be
/// left empty.
#[derive(Clone, Copy)]
pub struct ParticipationRows<'a> {
    pub events: &'a [FestivalEvent],
    pub nominations: &'a [EventNomination],
    pub bookings: &'a [AartiBooking],
    pub bhog: &'a [BhogNomination],
}

#[must_use]
pub fn participation_overview(rows: ParticipationRows<'_>, tab: Tab) -> ParticipationOverview {
    let mut buildings: BTreeMap<String, BuildingParticipation> = BTreeMap::new();
    let mut flats_by_building: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut record = |building: &str, flat: &str| {
        flats_by_building
            .entry(building.to_owned())
            .or_default()
            .insert(flat.to_owned());
    };
    for nomination in rows.nominations {
        record(&nomination.building, &nomination.flat);
        buildings.entry(nomination.building.clone()).or_default().nominations += 1;
    }
    for booking in rows.bookings {
        record(&booking.building, &booking.flat);
        buildings.entry(booking.building.clone()).or_default().aarti_bookings += 1;
    }
    for bhog in rows.bhog {
        record(&bhog.building, &bhog.flat);
        buildings.entry(bhog.building.clone()).or_default().bhog_nominations += 1;
    }
    for (building, flats) in &flats_by_building {
        buildings.entry(building.clone()).or_default().unique_flats = flats.len();
    }

    ParticipationOverview {
        total_unique_flats: flats_by_building.values().map(BTreeSet::len).sum(),
        buildings,
        events: tab
            .shows(Tab::Events)
            .then(|| event_participation(rows.events, rows.nominations)),
        aarti: tab
            .shows(Tab::Aarti)
            .then(|| aarti_participation(rows.bookings)),
        bhog: tab
            .shows(Tab::Bhog)
            .then(|| bhog_summary(&rows.bhog.iter().collect::<Vec<_>>())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn nomination(id: i64, title: &str, building: &str, flat: &str, name: &str) -> EventNomination {
        EventNomination {
            id,
            event_title: title.to_owned(),
            event_date: "29th August".to_owned(),
            user_name: name.to_owned(),
            phone_number: "9876543210".to_owned(),
            building: building.to_owned(),
            flat: flat.to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn bhog(id: i64, building: &str, flat: &str, item: &str) -> BhogNomination {
        BhogNomination {
            id,
            user_name: "Kiran".to_owned(),
            phone_number: "9123456780".to_owned(),
            building: building.to_owned(),
            flat: flat.to_owned(),
            bhog_item: item.to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking(id: i64, date: &str, time: &str, flat: &str) -> AartiBooking {
        AartiBooking {
            id,
            user_name: "Asha".to_owned(),
            phone_number: None,
            aarti_date: date.to_owned(),
            aarti_time: time.to_owned(),
            building: flat[..1].to_owned(),
            flat: flat.to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample() -> Vec<EventNomination> {
        vec![
            nomination(1, "Rangoli", "A", "A101", "Asha"),
            nomination(2, "Dance", "B", "B202", "Ravi"),
            nomination(3, "Rangoli", "A", "A101", "Meera"),
            nomination(4, "Quiz", "C", "C301", "Kiran"),
            nomination(5, "Dance", "A", "A102", "Dev"),
        ]
    }

    #[test]
    fn grouping_partitions_every_row_once() {
        let rows = sample();
        let groups = get_grouped_event_nominations(&rows);
        assert_eq!(groups.len(), 3);
        let mut ids: Vec<i64> = groups
            .iter()
            .flat_map(|(title, group)| {
                assert!(group.iter().all(|row| &row.event_title == title));
                group.iter().map(|row| row.id)
            })
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unique_flats_ignore_duplicates() {
        assert_eq!(get_unique_flats([("A", "101"), ("A", "101"), ("B", "202")]), 2);
        assert_eq!(get_unique_flats(std::iter::empty()), 0);
    }

    #[test]
    fn nomination_filters_combine() {
        let rows = sample();
        let by_search = NominationFilter {
            search: Some("RAV".to_owned()),
            ..NominationFilter::default()
        };
        assert_eq!(filter_nominations(&rows, &by_search).len(), 1);

        let by_building_and_event = NominationFilter {
            building: Some("a".to_owned()),
            event: Some("Dance".to_owned()),
            ..NominationFilter::default()
        };
        let found = filter_nominations(&rows, &by_building_and_event);
        assert_eq!(found.iter().map(|row| row.id).collect::<Vec<_>>(), vec![5]);

        let everything = NominationFilter {
            building: Some("all".to_owned()),
            search: Some("  ".to_owned()),
            ..NominationFilter::default()
        };
        assert_eq!(filter_nominations(&rows, &everything).len(), 5);
    }

    #[test]
    fn bhog_summary_counts_flats_and_items() {
        let rows = vec![
            bhog(1, "A", "A101", "Modak"),
            bhog(2, "A", "A101", "modak "),
            bhog(3, "B", "B201", "Ladoo"),
        ];
        let filtered = filter_bhog(&rows, &BhogFilter::default());
        let summary = bhog_summary(&filtered);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unique_flats, 2);
        assert_eq!(summary.distinct_items, 2);
        assert_eq!(summary.by_building.get("A"), Some(&2));

        let ladoo = BhogFilter {
            search: Some("lad".to_owned()),
            building: None,
        };
        assert_eq!(filter_bhog(&rows, &ladoo).len(), 1);
    }

    #[test]
    fn slot_status_is_recomputed_from_bookings() {
        let calendar = vec![
            AartiSlotRef {
                date: "27th August".to_owned(),
                time: "Morning".to_owned(),
            },
            AartiSlotRef {
                date: "27th August".to_owned(),
                time: "Evening".to_owned(),
            },
        ];
        let bookings = vec![booking(1, "27th August", "Morning", "A101")];
        let statuses = slot_statuses(&calendar, &bookings);
        assert!(statuses[0].booked);
        assert_eq!(statuses[0].booked_flats, vec!["A101".to_owned()]);
        assert!(!statuses[1].booked);
    }

    #[test]
    fn overview_covers_every_kind() {
        let events = vec![
            FestivalEvent {
                event: "Rangoli".to_owned(),
                date: "29th August".to_owned(),
                contact: String::new(),
            },
            FestivalEvent {
                event: "Drama".to_owned(),
                date: "30th August".to_owned(),
                contact: String::new(),
            },
        ];
        let nominations = sample();
        let bookings = vec![
            booking(1, "27th August", "Morning", "A101"),
            booking(2, "27th August", "Morning", "D401"),
        ];
        let bhog_rows = vec![bhog(1, "B", "B202", "Modak")];
        let rows = ParticipationRows {
            events: &events,
            nominations: &nominations,
            bookings: &bookings,
            bhog: &bhog_rows,
        };

        let overview = participation_overview(rows, Tab::All);
        // A101 A102 B202 C301 D401
        assert_eq!(overview.total_unique_flats, 5);
        assert_eq!(overview.buildings["A"].unique_flats, 2);
        assert_eq!(overview.buildings["A"].aarti_bookings, 1);
        let events = overview.events.unwrap();
        assert_eq!(events[0].event_title, "Rangoli");
        assert_eq!(events[0].nominations, 2);
        assert_eq!(events[0].unique_flats, 1);
        assert_eq!(events[1].nominations, 0);
        assert_eq!(events.len(), 4);
        assert_eq!(overview.aarti.unwrap()[0].flats, vec!["A101", "D401"]);

        let only_bhog = participation_overview(rows, Tab::Bhog);
        assert!(only_bhog.events.is_none());
        assert!(only_bhog.aarti.is_none());
        assert_eq!(only_bhog.bhog.unwrap().total, 1);
    }
}
