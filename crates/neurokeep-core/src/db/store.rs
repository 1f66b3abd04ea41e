//! Read-only query contract consumed by the analytics engine.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::{Database, DbError, DbResult};
use crate::models::{BpLog, Event, EventType, Medication, Patient, Role};

/// Read view over persisted patients, events and blood-pressure logs.
///
/// The analytics and report layers only ever query through this trait, by
/// id, and never traverse live object graphs.
pub trait EventStore {
    /// Number of `event_type` events for a patient on a civil day.
    fn count_events(&self, patient_id: &str, event_type: &EventType, date: NaiveDate)
        -> DbResult<u32>;

    /// Latest reading on a civil day.
    fn latest_bp_log(&self, patient_id: &str, date: NaiveDate) -> DbResult<Option<BpLog>>;

    fn list_medications(&self, patient_id: &str) -> DbResult<Vec<Medication>>;

    /// Most recent events of a patient, newest first.
    fn recent_events(&self, patient_id: &str, limit: usize) -> DbResult<Vec<Event>>;

    /// Latest reading regardless of day.
    fn latest_bp_reading(&self, patient_id: &str) -> DbResult<Option<BpLog>>;

    /// Most recent readings, newest first.
    fn recent_bp_logs(&self, patient_id: &str, limit: usize) -> DbResult<Vec<BpLog>>;

    /// Medication IDs confirmed at least once on a civil day.
    fn confirmed_medications_on(&self, patient_id: &str, date: NaiveDate)
        -> DbResult<HashSet<String>>;

    fn get_patient(&self, patient_id: &str) -> DbResult<Option<Patient>>;

    fn list_patients(&self, role: Role) -> DbResult<Vec<Patient>>;

    /// Run `f` against one consistent view of the store.
    ///
    /// Stores without transactional reads may rely on this default.
    fn snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        f(self)
    }
}

impl EventStore for Database {
    fn count_events(
        &self,
        patient_id: &str,
        event_type: &EventType,
        date: NaiveDate,
    ) -> DbResult<u32> {
        Database::count_events(self, patient_id, event_type, date)
    }

    fn latest_bp_log(&self, patient_id: &str, date: NaiveDate) -> DbResult<Option<BpLog>> {
        Database::latest_bp_log(self, patient_id, date)
    }

    fn list_medications(&self, patient_id: &str) -> DbResult<Vec<Medication>> {
        Database::list_medications(self, patient_id)
    }

    fn recent_events(&self, patient_id: &str, limit: usize) -> DbResult<Vec<Event>> {
        Database::recent_events(self, patient_id, limit)
    }

    fn latest_bp_reading(&self, patient_id: &str) -> DbResult<Option<BpLog>> {
        Database::latest_bp_reading(self, patient_id)
    }

    fn recent_bp_logs(&self, patient_id: &str, limit: usize) -> DbResult<Vec<BpLog>> {
        Database::recent_bp_logs(self, patient_id, limit)
    }

    fn confirmed_medications_on(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> DbResult<HashSet<String>> {
        Database::confirmed_medications_on(self, patient_id, date)
    }

    fn get_patient(&self, patient_id: &str) -> DbResult<Option<Patient>> {
        Database::get_patient(self, patient_id)
    }

    fn list_patients(&self, role: Role) -> DbResult<Vec<Patient>> {
        Database::list_patients(self, role)
    }

    fn snapshot<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DbError>,
    {
        self.read_snapshot(f)
    }
}
