//! Event log database operations.
//!
//! The log is append-only; the schema rejects UPDATE and DELETE.

use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::{params, Row};
use serde_json::{Map, Value};

use super::{conversion_error, Database, DbResult};
use crate::models::{Event, EventType};

const EVENT_COLUMNS: &str = "id, patient_id, medication_id, event_type, timestamp, metadata";

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let event_type: String = row.get(3)?;
    let metadata: String = row.get(5)?;
    let metadata: Map<String, Value> =
        serde_json::from_str(&metadata).map_err(|e| conversion_error(5, e))?;

    Ok(Event {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        medication_id: row.get(2)?,
        event_type: EventType::from_tag(&event_type),
        timestamp: row.get(4)?,
        metadata,
    })
}

impl Database {
    /// Append an event to the log.
    pub fn append_event(&self, event: &Event) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO events (id, patient_id, medication_id, event_type, timestamp, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                event.id,
                event.patient_id,
                event.medication_id,
                event.event_type.as_str(),
                event.timestamp,
                event.metadata_json(),
            ],
        )?;
        tracing::debug!(
            event_type = %event.event_type,
            patient_id = ?event.patient_id,
            "event appended"
        );
        Ok(())
    }

    /// Number of events of one type for a patient on a civil calendar day.
    pub fn count_events(
        &self,
        patient_id: &str,
        event_type: &EventType,
        date: NaiveDate,
    ) -> DbResult<u32> {
        let count: u32 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM events
            WHERE patient_id = ?1 AND event_type = ?2 AND date(timestamp) = ?3
            "#,
            params![patient_id, event_type.as_str(), date],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// A patient's most recent events, newest first.
    pub fn recent_events(&self, patient_id: &str, limit: usize) -> DbResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM events
            WHERE patient_id = ?1
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?2
            "#,
            EVENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![patient_id, limit as i64], event_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every event of a patient, newest first.
    pub fn all_events(&self, patient_id: &str) -> DbResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM events
            WHERE patient_id = ?1
            ORDER BY timestamp DESC, rowid DESC
            "#,
            EVENT_COLUMNS
        ))?;

        let rows = stmt.query_map([patient_id], event_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Most recent events across all patients and system events, newest first.
    pub fn latest_events(&self, limit: usize) -> DbResult<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM events
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?1
            "#,
            EVENT_COLUMNS
        ))?;

        let rows = stmt.query_map([limit as i64], event_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Medication IDs with at least one `dose_confirmed` event on a day.
    pub fn confirmed_medications_on(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> DbResult<HashSet<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT medication_id FROM events
            WHERE patient_id = ?1
              AND event_type = ?2
              AND date(timestamp) = ?3
              AND medication_id IS NOT NULL
            "#,
        )?;

        let rows = stmt.query_map(
            params![patient_id, EventType::DoseConfirmed.as_str(), date],
            |row| row.get::<_, String>(0),
        )?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;
    use chrono::NaiveDateTime;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn setup() -> (Database, Patient) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Ivan".into(), at(1, 9, 0));
        db.insert_patient(&patient).unwrap();
        (db, patient)
    }

    #[test]
    fn test_append_and_recent() {
        let (db, patient) = setup();

        let older = Event::new(&patient.id, EventType::ReminderSent, at(3, 8, 0));
        let newer = Event::new(&patient.id, EventType::DoseConfirmed, at(3, 8, 4))
            .with_meta("time_to_confirm_seconds", 240);
        db.append_event(&older).unwrap();
        db.append_event(&newer).unwrap();

        let events = db.recent_events(&patient.id, 10).unwrap();
        assert_eq!(events, vec![newer.clone(), older]);

        let limited = db.recent_events(&patient.id, 1).unwrap();
        assert_eq!(limited, vec![newer]);
    }

    #[test]
    fn test_count_by_civil_day() {
        let (db, patient) = setup();

        for (day, h) in [(3, 8), (3, 23), (4, 0)] {
            db.append_event(&Event::new(&patient.id, EventType::DoseConfirmed, at(day, h, 59)))
                .unwrap();
        }
        db.append_event(&Event::new(&patient.id, EventType::DoseSkipped, at(3, 9, 0)))
            .unwrap();

        let day3 = NaiveDate::from_ymd_opt(2026, 5, 3).unwrap();
        let day4 = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        assert_eq!(db.count_events(&patient.id, &EventType::DoseConfirmed, day3).unwrap(), 2);
        assert_eq!(db.count_events(&patient.id, &EventType::DoseConfirmed, day4).unwrap(), 1);
        assert_eq!(db.count_events(&patient.id, &EventType::DoseSkipped, day3).unwrap(), 1);
        assert_eq!(db.count_events("other", &EventType::DoseConfirmed, day3).unwrap(), 0);
    }

    #[test]
    fn test_unknown_tags_preserved() {
        let (db, patient) = setup();
        let custom = Event::new(&patient.id, EventType::Other("refill_requested".into()), at(3, 10, 0));
        db.append_event(&custom).unwrap();

        let events = db.all_events(&patient.id).unwrap();
        assert_eq!(events[0].event_type, EventType::Other("refill_requested".into()));
    }

    #[test]
    fn test_latest_events_includes_system() {
        let (db, patient) = setup();
        db.append_event(&Event::new(&patient.id, EventType::DashboardOpened, at(3, 10, 0)))
            .unwrap();
        db.append_event(&Event::system(EventType::DoctorPortalViewed, at(3, 11, 0)))
            .unwrap();

        let latest = db.latest_events(20).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].event_type, EventType::DoctorPortalViewed);
        assert!(latest[0].patient_id.is_none());
    }

    #[test]
    fn test_confirmed_medications_on() {
        let (db, patient) = setup();
        let med = crate::models::Medication::new(
            patient.id.clone(),
            "Enalapril".into(),
            "10mg".into(),
            crate::models::WindowPreset::Morning.window(),
            at(1, 9, 0),
        );
        db.insert_medication(&med).unwrap();

        db.append_event(
            &Event::new(&patient.id, EventType::DoseConfirmed, at(3, 8, 10)).with_medication(&med.id),
        )
        .unwrap();
        db.append_event(
            &Event::new(&patient.id, EventType::DoseConfirmed, at(3, 9, 10)).with_medication(&med.id),
        )
        .unwrap();
        // Confirmation without a medication reference does not count.
        db.append_event(&Event::new(&patient.id, EventType::DoseConfirmed, at(3, 9, 20)))
            .unwrap();

        let day3 = NaiveDate::from_ymd_opt(2026, 5, 3).unwrap();
        let confirmed = db.confirmed_medications_on(&patient.id, day3).unwrap();
        assert_eq!(confirmed.len(), 1);
        assert!(confirmed.contains(&med.id));

        let day4 = NaiveDate::from_ymd_opt(2026, 5, 4).unwrap();
        assert!(db.confirmed_medications_on(&patient.id, day4).unwrap().is_empty());
    }
}
