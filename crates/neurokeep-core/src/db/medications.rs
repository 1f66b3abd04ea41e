//! Medication database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{DosingWindow, Medication};

fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<Medication> {
    Ok(Medication {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        drug_name: row.get(2)?,
        dosage: row.get(3)?,
        window: DosingWindow {
            start: row.get(4)?,
            end: row.get(5)?,
        },
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Insert a medication for an existing patient.
    pub fn insert_medication(&self, medication: &Medication) -> DbResult<()> {
        if self.get_patient(&medication.patient_id)?.is_none() {
            return Err(DbError::NotFound(format!("patient {}", medication.patient_id)));
        }

        self.conn.execute(
            r#"
            INSERT INTO medications (
                id, patient_id, drug_name, dosage, window_start, window_end, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                medication.id,
                medication.patient_id,
                medication.drug_name,
                medication.dosage,
                medication.window.start,
                medication.window.end,
                medication.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a medication by ID.
    pub fn get_medication(&self, id: &str) -> DbResult<Option<Medication>> {
        self.conn
            .query_row(
                r#"
                SELECT id, patient_id, drug_name, dosage, window_start, window_end, created_at
                FROM medications
                WHERE id = ?
                "#,
                [id],
                medication_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All medications of a patient, in creation order.
    pub fn list_medications(&self, patient_id: &str) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, patient_id, drug_name, dosage, window_start, window_end, created_at
            FROM medications
            WHERE patient_id = ?
            ORDER BY created_at, rowid
            "#,
        )?;

        let rows = stmt.query_map([patient_id], medication_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
