//! services/client/src/app/schedules.rs
//!
//! State behind the Schedule page: the user's trips, the destinations they
//! point at, and the trip form.

use chrono::{NaiveDate, NaiveTime};
use ridetribe_core::domain::{
    Destination, Recurrence, ScheduleDraft, ScheduleEntry, ScheduleStatus,
};
use ridetribe_core::ports::{PortError, PortResult, Toast};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::forms::{parse_date, parse_time, required, Zone};
use super::resource_list::{ActionKey, ResourceList};
use super::session::SessionStore;
use super::state::AppState;

pub const UNKNOWN_DESTINATION: &str = "Unknown destination";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleForm {
    pub child_name: String,
    pub destination_id: Option<String>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time: Option<NaiveTime>,
    pub recurrence: Recurrence,
    /// Id of the trip being edited; `None` when creating.
    pub editing: Option<String>,
}

/// A trip joined with the destination it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRow {
    pub entry: ScheduleEntry,
    pub destination_name: String,
    /// The referenced destination has been deleted.
    pub orphaned: bool,
}

pub struct SchedulesController {
    state: Arc<AppState>,
    zone: Zone,
    schedules: ResourceList<ScheduleEntry>,
    destinations: ResourceList<Destination>,
    form: Mutex<ScheduleForm>,
}

impl SchedulesController {
    pub fn new(state: Arc<AppState>, session: Arc<SessionStore>) -> Self {
        Self::with_zone(state, session, Zone::Local)
    }

    /// Interprets picked dates and times in `zone` instead of the local one.
    pub fn with_zone(state: Arc<AppState>, session: Arc<SessionStore>, zone: Zone) -> Self {
        let api = state.schedules.clone();
        let toaster = state.toaster.clone();
        let schedules = ResourceList::new("trips", session.clone(), toaster.clone(), move || {
            let api = api.clone();
            async move { api.list_schedules().await }
        });
        let api = state.destinations.clone();
        let destinations = ResourceList::new("destinations", session, toaster, move || {
            let api = api.clone();
            async move { api.list_destinations().await }
        });
        Self {
            state,
            zone,
            schedules,
            destinations,
            form: Mutex::new(ScheduleForm::default()),
        }
    }

    /// Loads trips and destinations side by side.
    pub async fn mount(&self) -> PortResult<()> {
        futures::try_join!(self.schedules.load(), self.destinations.load())?;
        Ok(())
    }

    pub async fn items(&self) -> Vec<ScheduleEntry> {
        self.schedules.items().await
    }

    pub async fn destinations(&self) -> Vec<Destination> {
        self.destinations.items().await
    }

    pub async fn rows(&self) -> Vec<ScheduleRow> {
        let destinations = self.destinations.items().await;
        self.schedules
            .items()
            .await
            .into_iter()
            .map(|entry| {
                let name = entry
                    .destination
                    .as_ref()
                    .map(|d| d.name.clone())
                    .or_else(|| {
                        destinations
                            .iter()
                            .find(|d| d.id == entry.destination_id)
                            .map(|d| d.name.clone())
                    });
                match name {
                    Some(destination_name) => ScheduleRow {
                        entry,
                        destination_name,
                        orphaned: false,
                    },
                    None => {
                        debug!(trip = %entry.id, "Trip points at a deleted destination");
                        ScheduleRow {
                            entry,
                            destination_name: UNKNOWN_DESTINATION.to_string(),
                            orphaned: true,
                        }
                    }
                }
            })
            .collect()
    }

    //=====================================================================================
    // Form
    //=====================================================================================

    fn form_lock(&self) -> MutexGuard<'_, ScheduleForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn form(&self) -> ScheduleForm {
        self.form_lock().clone()
    }

    pub fn reset_form(&self) {
        *self.form_lock() = ScheduleForm::default();
    }

    pub async fn open_edit(&self, id: &str) -> PortResult<()> {
        let entry = self
            .schedules
            .get(id)
            .await
            .ok_or_else(|| PortError::NotFound(format!("Trip {}", id)))?;
        let pickup = entry.pickup_time.map(|t| self.zone.localize(&t));
        *self.form_lock() = ScheduleForm {
            child_name: entry.child_name.clone(),
            destination_id: Some(entry.destination_id.clone()),
            pickup_date: pickup.map(|t| t.date()),
            pickup_time: pickup.map(|t| t.time()),
            recurrence: entry.recurrence,
            editing: Some(entry.id),
        };
        Ok(())
    }

    pub fn set_child_name(&self, name: &str) {
        self.form_lock().child_name = name.to_string();
    }

    pub fn set_destination(&self, destination_id: &str) {
        self.form_lock().destination_id = Some(destination_id.to_string());
    }

    pub fn set_recurrence(&self, recurrence: Recurrence) {
        self.form_lock().recurrence = recurrence;
    }

    /// Accepts `YYYY-MM-DD`.
    pub fn set_pickup_date(&self, raw: &str) -> PortResult<()> {
        let date = parse_date(raw)?;
        self.form_lock().pickup_date = Some(date);
        Ok(())
    }

    /// Accepts `14:30` or `2:30 PM`.
    pub fn set_pickup_time(&self, raw: &str) -> PortResult<()> {
        let time = parse_time(raw)?;
        self.form_lock().pickup_time = Some(time);
        Ok(())
    }

    async fn draft(&self, form: &ScheduleForm) -> PortResult<ScheduleDraft> {
        let child_name = required(&form.child_name, "Child name")?;
        let destination_id = form
            .destination_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PortError::Validation("Destination is required".to_string()))?;
        let date = form
            .pickup_date
            .ok_or_else(|| PortError::Validation("Pickup date is required".to_string()))?;
        let time = form
            .pickup_time
            .ok_or_else(|| PortError::Validation("Pickup time is required".to_string()))?;

        let pickup = self.zone.compose(date, time)?;

        let status = match &form.editing {
            Some(id) => self
                .schedules
                .get(id)
                .await
                .map(|e| e.status)
                .unwrap_or_default(),
            None => ScheduleStatus::Active,
        };

        Ok(ScheduleDraft {
            child_name: child_name.to_string(),
            destination_id: destination_id.to_string(),
            pickup_time: pickup,
            dropoff_time: Some(pickup),
            recurrence: form.recurrence,
            status,
        })
    }

    pub async fn submit(&self) -> PortResult<ScheduleEntry> {
        let form = self.form();
        let draft = match self.draft(&form).await {
            Ok(draft) => draft,
            Err(e) => {
                self.state.toaster.show(Toast::error(e.user_message()));
                return Err(e);
            }
        };
        let api = self.state.schedules.clone();

        let saved = match form.editing {
            Some(id) => {
                self.schedules
                    .refetch(
                        ActionKey::new("save-trip", &id),
                        async { api.update_schedule(&id, &draft).await },
                        "Trip updated.",
                    )
                    .await?
            }
            None => {
                self.schedules
                    .refetch(
                        ActionKey::global("create-trip"),
                        async { api.create_schedule(&draft).await },
                        "Trip added.",
                    )
                    .await?
            }
        };
        self.reset_form();
        Ok(saved)
    }

    pub async fn delete(&self, id: &str) -> PortResult<bool> {
        if !self
            .state
            .confirmer
            .confirm("Are you sure you want to delete this trip?")
        {
            return Ok(false);
        }
        let api = self.state.schedules.clone();
        self.schedules
            .refetch(
                ActionKey::new("delete-trip", id),
                async { api.delete_schedule(id).await },
                "Trip deleted.",
            )
            .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fakes::{destination, schedule, Harness};
    use assert_matches::assert_matches;
    use chrono::{FixedOffset, TimeZone, Timelike, Utc};

    async fn controller(h: &Harness, zone: Zone) -> SchedulesController {
        let c = SchedulesController::with_zone(h.state.clone(), h.session.clone(), zone);
        c.mount().await.unwrap();
        c
    }

    #[tokio::test]
    async fn mount_loads_trips_and_destinations() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        h.backend.seed_schedules(vec![schedule("s1", "Ava", "d1")]);
        let c = controller(&h, Zone::Local).await;

        assert_eq!(c.items().await.len(), 1);
        assert_eq!(c.destinations().await.len(), 1);
    }

    #[tokio::test]
    async fn pickup_keeps_the_picked_wall_clock_time() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        let pacific = FixedOffset::west_opt(7 * 3600).unwrap();
        let c = controller(&h, Zone::Fixed(pacific)).await;

        c.set_child_name("Ava");
        c.set_destination("d1");
        c.set_pickup_date("2024-05-01").unwrap();
        c.set_pickup_time("2:30 PM").unwrap();
        let saved = c.submit().await.unwrap();

        let pickup = saved.pickup_time.unwrap();
        let wall = Zone::Fixed(pacific).localize(&pickup);
        assert_eq!(wall.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!((wall.hour(), wall.minute()), (14, 30));
        assert_eq!(pickup, pacific.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap());
        assert_eq!(saved.dropoff_time, Some(pickup));
        assert_eq!(c.items().await.len(), 1);
        assert_eq!(c.form(), ScheduleForm::default());
    }

    #[tokio::test]
    async fn incomplete_form_is_rejected_without_a_request() {
        let h = Harness::signed_in().await;
        let c = controller(&h, Zone::Local).await;

        c.set_child_name("Ava");
        c.set_destination("d1");
        assert_matches!(
            c.submit().await,
            Err(PortError::Validation(m)) if m.contains("Pickup date")
        );
        assert_eq!(h.backend.calls("create_schedule"), 0);
    }

    #[tokio::test]
    async fn trips_to_deleted_destinations_are_marked_orphaned() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        h.backend.seed_schedules(vec![
            schedule("s1", "Ava", "d1"),
            schedule("s2", "Ben", "gone"),
        ]);
        let c = controller(&h, Zone::Local).await;

        let rows = c.rows().await;
        assert_eq!(rows[0].destination_name, "School");
        assert!(!rows[0].orphaned);
        assert_eq!(rows[1].destination_name, UNKNOWN_DESTINATION);
        assert!(rows[1].orphaned);
    }

    #[tokio::test]
    async fn editing_keeps_the_trip_status() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        let mut trip = schedule("s1", "Ava", "d1");
        trip.status = ScheduleStatus::Completed;
        h.backend.seed_schedules(vec![trip]);
        let c = controller(&h, Zone::Local).await;

        c.open_edit("s1").await.unwrap();
        c.set_child_name("Ava Lee");
        let saved = c.submit().await.unwrap();

        assert_eq!(saved.status, ScheduleStatus::Completed);
        assert_eq!(c.items().await[0].child_name, "Ava Lee");
    }

    #[tokio::test]
    async fn saving_an_unchanged_trip_keeps_its_pickup_instant() {
        let h = Harness::signed_in().await;
        h.backend.seed_destinations(vec![destination("d1", "School")]);
        let stored = Utc.with_ymd_and_hms(2024, 5, 1, 21, 30, 0).unwrap().fixed_offset();
        let mut trip = schedule("s1", "Ava", "d1");
        trip.pickup_time = Some(stored);
        trip.dropoff_time = Some(stored);
        h.backend.seed_schedules(vec![trip]);
        let pacific = FixedOffset::west_opt(7 * 3600).unwrap();
        let c = controller(&h, Zone::Fixed(pacific)).await;

        c.open_edit("s1").await.unwrap();
        let form = c.form();
        assert_eq!(form.pickup_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(form.pickup_time.map(|t| (t.hour(), t.minute())), Some((14, 30)));

        let saved = c.submit().await.unwrap();
        assert_eq!(saved.pickup_time, Some(stored));
        assert_eq!(c.items().await[0].pickup_time, Some(stored));
    }
}
