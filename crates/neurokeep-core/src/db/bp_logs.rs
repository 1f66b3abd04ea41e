//! Blood-pressure log database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::BpLog;

const BP_COLUMNS: &str = "id, patient_id, systolic, diastolic, context, notes, timestamp";

fn bp_log_from_row(row: &Row<'_>) -> rusqlite::Result<BpLog> {
    Ok(BpLog {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        systolic: row.get(2)?,
        diastolic: row.get(3)?,
        context: row.get(4)?,
        notes: row.get(5)?,
        timestamp: row.get(6)?,
    })
}

impl Database {
    /// Insert a reading.
    pub fn insert_bp_log(&self, log: &BpLog) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO bp_logs (id, patient_id, systolic, diastolic, context, notes, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.id,
                log.patient_id,
                log.systolic,
                log.diastolic,
                log.context,
                log.notes,
                log.timestamp,
            ],
        )?;
        Ok(())
    }

    /// The latest reading on a civil calendar day.
    ///
    /// Equal timestamps resolve to the later insert.
    pub fn latest_bp_log(&self, patient_id: &str, date: NaiveDate) -> DbResult<Option<BpLog>> {
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {} FROM bp_logs
                    WHERE patient_id = ?1 AND date(timestamp) = ?2
                    ORDER BY timestamp DESC, rowid DESC
                    LIMIT 1
                    "#,
                    BP_COLUMNS
                ),
                params![patient_id, date],
                bp_log_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// The latest reading overall.
    pub fn latest_bp_reading(&self, patient_id: &str) -> DbResult<Option<BpLog>> {
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {} FROM bp_logs
                    WHERE patient_id = ?1
                    ORDER BY timestamp DESC, rowid DESC
                    LIMIT 1
                    "#,
                    BP_COLUMNS
                ),
                [patient_id],
                bp_log_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// A patient's most recent readings, newest first.
    pub fn recent_bp_logs(&self, patient_id: &str, limit: usize) -> DbResult<Vec<BpLog>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM bp_logs
            WHERE patient_id = ?1
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?2
            "#,
            BP_COLUMNS
        ))?;

        let rows = stmt.query_map(params![patient_id, limit as i64], bp_log_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BpReadingInput, Patient};
    use chrono::NaiveDateTime;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn setup() -> (Database, Patient) {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Maria".into(), at(1, 9, 0));
        db.insert_patient(&patient).unwrap();
        (db, patient)
    }

    #[test]
    fn test_latest_on_day_picks_later_reading() {
        let (db, patient) = setup();

        // Insert the later reading first; ordering must follow the timestamp.
        let evening = BpLog::new(&patient.id, BpReadingInput::new(128, 82), at(5, 20, 0));
        let morning = BpLog::new(&patient.id, BpReadingInput::new(150, 95), at(5, 8, 0));
        db.insert_bp_log(&evening).unwrap();
        db.insert_bp_log(&morning).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 6, 5).unwrap();
        let latest = db.latest_bp_log(&patient.id, day).unwrap().unwrap();
        assert_eq!(latest, evening);

        let empty_day = NaiveDate::from_ymd_opt(2026, 6, 6).unwrap();
        assert!(db.latest_bp_log(&patient.id, empty_day).unwrap().is_none());
    }

    #[test]
    fn test_same_timestamp_later_insert_wins() {
        let (db, patient) = setup();
        let first = BpLog::new(&patient.id, BpReadingInput::new(140, 90), at(5, 8, 0));
        let second = BpLog::new(&patient.id, BpReadingInput::new(132, 86), at(5, 8, 0));
        db.insert_bp_log(&first).unwrap();
        db.insert_bp_log(&second).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 6, 5).unwrap();
        assert_eq!(db.latest_bp_log(&patient.id, day).unwrap().unwrap().id, second.id);
    }

    #[test]
    fn test_latest_reading_and_recent() {
        let (db, patient) = setup();
        assert!(db.latest_bp_reading(&patient.id).unwrap().is_none());

        for day in 2..=8 {
            let log = BpLog::new(&patient.id, BpReadingInput::new(130 + day as i32, 85), at(day, 8, 30));
            db.insert_bp_log(&log).unwrap();
        }

        let latest = db.latest_bp_reading(&patient.id).unwrap().unwrap();
        assert_eq!(latest.systolic, 138);

        let recent = db.recent_bp_logs(&patient.id, 5).unwrap();
        let systolic: Vec<_> = recent.iter().map(|l| l.systolic).collect();
        assert_eq!(systolic, vec![138, 137, 136, 135, 134]);
    }
}
