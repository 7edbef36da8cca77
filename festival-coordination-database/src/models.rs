use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{aarti_bookings, aarti_schedule, bhog_nominations, event_nominations};

/// One flat's commitment to attend an aarti slot.
#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = aarti_bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AartiBooking {
    pub id: i64,
    pub user_name: String,
    pub phone_number: Option<String>,
    pub aarti_date: String,
    pub aarti_time: String,
    pub building: String,
    pub flat: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AartiBooking {
    #[must_use]
    pub fn occupies(&self, date: &str, time: &str, building: &str, flat: &str) -> bool {
        self.aarti_date == date
            && self.aarti_time == time
            && self.building == building
            && self.flat == flat
    }
}

#[derive(Insertable, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = aarti_bookings)]
pub struct NewAartiBooking {
    pub user_name: String,
    pub phone_number: Option<String>,
    pub aarti_date: String,
    pub aarti_time: String,
    pub building: String,
    pub flat: String,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = event_nominations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventNomination {
    pub id: i64,
    pub event_title: String,
    pub event_date: String,
    pub user_name: String,
    pub phone_number: String,
    pub building: String,
    pub flat: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = event_nominations)]
pub struct NewEventNomination {
    pub event_title: String,
    pub event_date: String,
    pub user_name: String,
    pub phone_number: String,
    pub building: String,
    pub flat: String,
}

#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = bhog_nominations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BhogNomination {
    pub id: i64,
    pub user_name: String,
    pub phone_number: String,
    pub building: String,
    pub flat: String,
    pub bhog_item: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = bhog_nominations)]
pub struct NewBhogNomination {
    pub user_name: String,
    pub phone_number: String,
    pub building: String,
    pub flat: String,
    pub bhog_item: String,
}

// mostly vestigial, booked state is recomputed from aarti_bookings
#[derive(Queryable, Selectable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = aarti_schedule)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AartiScheduleSlot {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub is_booked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[diesel(table_name = aarti_schedule)]
pub struct NewAartiScheduleSlot {
    pub date: String,
    pub time: String,
}
