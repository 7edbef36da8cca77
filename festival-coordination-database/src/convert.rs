//! Mapping between the flat snake_case rows stored in the database and the
//! nested camelCase view model the booking pages work with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AartiBooking, NewAartiBooking};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AartiSlotRef {
    pub date: String,
    pub time: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AartiSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub user_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub aarti_schedule: AartiSlotRef,
    pub building: String,
    pub flat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[must_use]
pub fn convert_booking_to_submission(booking: &AartiBooking) -> AartiSubmission {
    AartiSubmission {
        id: Some(booking.id),
        user_name: booking.user_name.clone(),
        phone_number: booking.phone_number.clone(),
        aarti_schedule: AartiSlotRef {
            date: booking.aarti_date.clone(),
            time: booking.aarti_time.clone(),
        },
        building: booking.building.clone(),
        flat: booking.flat.clone(),
        created_at: Some(booking.created_at),
    }
}

/// The id and timestamps are assigned by the database, so they are dropped.
#[must_use]
pub fn convert_submission_to_booking(submission: &AartiSubmission) -> NewAartiBooking {
    NewAartiBooking {
        user_name: submission.user_name.clone(),
        phone_number: submission.phone_number.clone(),
        aarti_date: submission.aarti_schedule.date.clone(),
        aarti_time: submission.aarti_schedule.time.clone(),
        building: submission.building.clone(),
        flat: submission.flat.clone(),
    }
}

/// What a freshly inserted row looks like once the database filled in its
/// generated columns.
#[cfg(any(test, feature = "test-util"))]
#[must_use]
pub fn persisted(new: NewAartiBooking, id: i64, at: DateTime<Utc>) -> AartiBooking {
    AartiBooking {
        id,
        user_name: new.user_name,
        phone_number: new.phone_number,
        aarti_date: new.aarti_date,
        aarti_time: new.aarti_time,
        building: new.building,
        flat: new.flat,
        created_at: at,
        updated_at: at,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn submission(phone: Option<&str>) -> AartiSubmission {
        AartiSubmission {
            id: None,
            user_name: "Asha Patil".to_owned(),
            phone_number: phone.map(ToOwned::to_owned),
            aarti_schedule: AartiSlotRef {
                date: "27th August".to_owned(),
                time: "Morning".to_owned(),
            },
            building: "A".to_owned(),
            flat: "A101".to_owned(),
            created_at: None,
        }
    }

    #[test]
    fn submission_round_trips_through_booking() {
        let at = Utc.with_ymd_and_hms(2024, 8, 20, 6, 30, 0).unwrap();
        for submitted in [submission(Some("9876543210")), submission(None)] {
            let row = persisted(convert_submission_to_booking(&submitted), 42, at);
            let back = convert_booking_to_submission(&row);
            assert_eq!(back.id, Some(42));
            assert_eq!(back.created_at, Some(at));
            assert_eq!(
                AartiSubmission {
                    id: None,
                    created_at: None,
                    ..back
                },
                submitted
            );
        }
    }

    #[test]
    fn submission_wire_shape_is_nested_camel_case() {
        let json = serde_json::to_value(submission(None)).unwrap();
        assert_eq!(json["userName"], "Asha Patil");
        assert_eq!(json["aartiSchedule"]["date"], "27th August");
        assert_eq!(json["aartiSchedule"]["time"], "Morning");
        assert!(json.get("id").is_none());

        let parsed: AartiSubmission = serde_json::from_value(serde_json::json!({
            "userName": "Ravi",
            "aartiSchedule": { "date": "28th August", "time": "Evening" },
            "building": "B",
            "flat": "B202"
        }))
        .unwrap();
        assert_eq!(parsed.phone_number, None);
        assert_eq!(convert_submission_to_booking(&parsed).aarti_time, "Evening");
    }
}
