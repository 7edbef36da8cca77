//! Method-per-query access to the festival tables.
//!
//! Every public query comes in two flavours: a `try_*` method returning the
//! [`DatabaseError`], and a lenient one that logs the error and hands back an
//! empty list, `None` or `false`. Pages use the lenient ones, so a failed
//! fetch looks exactly like an empty table to them.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, error, info};

use crate::error::DatabaseError;
use crate::models::{
    AartiBooking, AartiScheduleSlot, BhogNomination, EventNomination, NewAartiBooking,
    NewAartiScheduleSlot, NewBhogNomination, NewEventNomination,
};
use crate::schema::{aarti_bookings, aarti_schedule, bhog_nominations, event_nominations};
use crate::Pool;

#[derive(Clone)]
pub struct Gateway {
    pool: Pool,
}

/// Outcome of seeding the schedule table from the fixture calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSeed {
    AlreadyPresent,
    Inserted(usize),
}

fn logged<T>(operation: &str, result: Result<T, DatabaseError>, fallback: T) -> T {
    result.unwrap_or_else(|err| {
        error!("{operation} failed: {err}");
        fallback
    })
}

impl Gateway {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn try_get_all_bookings(&self) -> Result<Vec<AartiBooking>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(aarti_bookings::table
            .order(aarti_bookings::created_at.desc())
            .select(AartiBooking::as_select())
            .load(&mut connection)
            .await?)
    }

    /// All bookings, newest first.
    pub async fn get_all_bookings(&self) -> Vec<AartiBooking> {
        logged("loading bookings", self.try_get_all_bookings().await, Vec::new())
    }

    pub async fn try_create_booking(
        &self,
        row: &NewAartiBooking,
    ) -> Result<AartiBooking, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(aarti_bookings::table)
            .values(row)
            .returning(AartiBooking::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    pub async fn create_booking(&self, row: &NewAartiBooking) -> Option<AartiBooking> {
        match self.try_create_booking(row).await {
            Ok(booking) => {
                debug!("booked {} for {} {}", booking.flat, booking.aarti_date, booking.aarti_time);
                Some(booking)
            }
            Err(err) if err.is_unique_violation() => {
                error!(
                    "{} is already booked for {} {}",
                    row.flat, row.aarti_date, row.aarti_time
                );
                None
            }
            Err(err) => {
                error!("creating booking failed: {err}");
                None
            }
        }
    }

    pub async fn try_delete_booking(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let deleted = diesel::delete(aarti_bookings::table.find(id))
            .execute(&mut connection)
            .await?;
        Ok(deleted > 0)
    }

    pub async fn delete_booking(&self, id: i64) -> bool {
        logged("deleting booking", self.try_delete_booking(id).await, false)
    }

    pub async fn try_get_event_nominations(
        &self,
        event_title: &str,
    ) -> Result<Vec<EventNomination>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(event_nominations::table
            .filter(event_nominations::event_title.eq(event_title))
            .order(event_nominations::created_at.desc())
            .select(EventNomination::as_select())
            .load(&mut connection)
            .await?)
    }

    pub async fn get_event_nominations(&self, event_title: &str) -> Vec<EventNomination> {
        logged(
            "loading event nominations",
            self.try_get_event_nominations(event_title).await,
            Vec::new(),
        )
    }

    pub async fn try_get_all_event_nominations(
        &self,
    ) -> Result<Vec<EventNomination>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(event_nominations::table
            .order(event_nominations::created_at.desc())
            .select(EventNomination::as_select())
            .load(&mut connection)
            .await?)
    }

    pub async fn get_all_event_nominations(&self) -> Vec<EventNomination> {
        logged(
            "loading all event nominations",
            self.try_get_all_event_nominations().await,
            Vec::new(),
        )
    }

    pub async fn try_create_event_nomination(
        &self,
        row: &NewEventNomination,
    ) -> Result<EventNomination, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(event_nominations::table)
            .values(row)
            .returning(EventNomination::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    pub async fn create_event_nomination(
        &self,
        row: &NewEventNomination,
    ) -> Option<EventNomination> {
        self.try_create_event_nomination(row)
            .await
            .map_err(|err| error!("creating event nomination failed: {err}"))
            .ok()
    }

    pub async fn try_delete_event_nomination(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let deleted = diesel::delete(event_nominations::table.find(id))
            .execute(&mut connection)
            .await?;
        Ok(deleted > 0)
    }

    pub async fn delete_event_nomination(&self, id: i64) -> bool {
        logged(
            "deleting event nomination",
            self.try_delete_event_nomination(id).await,
            false,
        )
    }

    pub async fn try_get_all_bhog_nominations(
        &self,
    ) -> Result<Vec<BhogNomination>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(bhog_nominations::table
            .order(bhog_nominations::created_at.desc())
            .select(BhogNomination::as_select())
            .load(&mut connection)
            .await?)
    }

    pub async fn get_all_bhog_nominations(&self) -> Vec<BhogNomination> {
        logged(
            "loading bhog nominations",
            self.try_get_all_bhog_nominations().await,
            Vec::new(),
        )
    }

    pub async fn try_create_bhog_nomination(
        &self,
        row: &NewBhogNomination,
    ) -> Result<BhogNomination, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(bhog_nominations::table)
            .values(row)
            .returning(BhogNomination::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    pub async fn create_bhog_nomination(&self, row: &NewBhogNomination) -> Option<BhogNomination> {
        self.try_create_bhog_nomination(row)
            .await
            .map_err(|err| error!("creating bhog nomination failed: {err}"))
            .ok()
    }

    pub async fn try_delete_bhog_nomination(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let deleted = diesel::delete(bhog_nominations::table.find(id))
            .execute(&mut connection)
            .await?;
        Ok(deleted > 0)
    }

    pub async fn delete_bhog_nomination(&self, id: i64) -> bool {
        logged(
            "deleting bhog nomination",
            self.try_delete_bhog_nomination(id).await,
            false,
        )
    }

    pub async fn try_get_aarti_schedule(&self) -> Result<Vec<AartiScheduleSlot>, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(aarti_schedule::table
            .order(aarti_schedule::id.asc())
            .select(AartiScheduleSlot::as_select())
            .load(&mut connection)
            .await?)
    }

    pub async fn get_aarti_schedule(&self) -> Vec<AartiScheduleSlot> {
        logged(
            "loading aarti schedule",
            self.try_get_aarti_schedule().await,
            Vec::new(),
        )
    }

    /// Seeds the schedule once. Two instances starting at the same moment can
    /// both see an empty table and both insert; nothing guards against that.
    pub async fn try_initialize_aarti_schedule(
        &self,
        rows: &[NewAartiScheduleSlot],
    ) -> Result<ScheduleSeed, DatabaseError> {
        let mut connection = self.pool.get().await?;
        let existing: i64 = aarti_schedule::table
            .count()
            .get_result(&mut connection)
            .await?;
        if existing > 0 || rows.is_empty() {
            return Ok(ScheduleSeed::AlreadyPresent);
        }
        let inserted = diesel::insert_into(aarti_schedule::table)
            .values(rows)
            .execute(&mut connection)
            .await?;
        info!("seeded {inserted} aarti schedule slots");
        Ok(ScheduleSeed::Inserted(inserted))
    }

    pub async fn initialize_aarti_schedule(
        &self,
        rows: &[NewAartiScheduleSlot],
    ) -> Option<ScheduleSeed> {
        self.try_initialize_aarti_schedule(rows)
            .await
            .map_err(|err| error!("seeding aarti schedule failed: {err}"))
            .ok()
    }

    pub async fn try_mark_slot_booked(&self, date: &str, time: &str) -> Result<usize, DatabaseError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::update(
            aarti_schedule::table
                .filter(aarti_schedule::date.eq(date))
                .filter(aarti_schedule::time.eq(time)),
        )
        .set(aarti_schedule::is_booked.eq(true))
        .execute(&mut connection)
        .await?)
    }

    pub async fn mark_slot_booked(&self, date: &str, time: &str) -> bool {
        logged(
            "marking slot booked",
            self.try_mark_slot_booked(date, time).await.map(|n| n > 0),
            false,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get_database_connection;

    // nothing listens on port 1, every checkout fails
    fn unreachable() -> Gateway {
        Gateway::new(get_database_connection("postgres://festival@127.0.0.1:1/festival").unwrap())
    }

    #[tokio::test]
    async fn failed_reads_look_like_empty_tables() {
        let gateway = unreachable();
        assert!(gateway.try_get_aarti_schedule().await.is_err());
        assert!(gateway.get_aarti_schedule().await.is_empty());
        assert!(gateway.get_all_bookings().await.is_empty());
        assert!(gateway.get_event_nominations("Rangoli Competition").await.is_empty());
        assert!(gateway.get_all_bhog_nominations().await.is_empty());
    }

    #[tokio::test]
    async fn failed_writes_report_nothing_saved() {
        let gateway = unreachable();
        let booking = NewAartiBooking {
            user_name: "Asha".to_owned(),
            phone_number: None,
            aarti_date: "27th August".to_owned(),
            aarti_time: "Morning".to_owned(),
            building: "A".to_owned(),
            flat: "A101".to_owned(),
        };
        assert_eq!(gateway.create_booking(&booking).await, None);
        assert!(!gateway.mark_slot_booked("27th August", "Morning").await);
        assert!(gateway.try_delete_booking(1).await.is_err());
        assert!(!gateway.delete_booking(1).await);
        assert!(!gateway.delete_event_nomination(1).await);
        assert!(!gateway.delete_bhog_nomination(1).await);
    }
}
