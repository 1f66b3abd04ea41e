//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{conversion_error, Database, DbResult};
use crate::models::{Patient, Role};

const PATIENT_COLUMNS: &str = "id, name, phone, email, role, streak, bp_target_systolic, \
                               bp_target_diastolic, doctor_code, created_at";

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    let role: String = row.get(4)?;
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        role: role.parse::<Role>().map_err(|e| conversion_error(4, e))?,
        streak: row.get(5)?,
        bp_target_systolic: row.get(6)?,
        bp_target_diastolic: row.get(7)?,
        doctor_code: row.get(8)?,
        created_at: row.get(9)?,
    })
}

impl Database {
    /// Insert a new patient or doctor.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, phone, email, role, streak, bp_target_systolic,
                bp_target_diastolic, doctor_code, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                patient.id,
                patient.name,
                patient.phone,
                patient.email,
                patient.role.as_str(),
                patient.streak,
                patient.bp_target_systolic,
                patient.bp_target_diastolic,
                patient.doctor_code,
                patient.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List accounts with the given role, ordered by name.
    pub fn list_patients(&self, role: Role) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE role = ? ORDER BY name, id",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([role.as_str()], patient_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Find the doctor owning a linkage code.
    pub fn find_doctor_by_code(&self, doctor_code: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM patients WHERE role = 'doctor' AND doctor_code = ? LIMIT 1",
                    PATIENT_COLUMNS
                ),
                [doctor_code],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Overwrite the cached streak. Returns false when the patient is unknown.
    pub fn update_patient_streak(&self, id: &str, streak: u32) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET streak = ?1 WHERE id = ?2",
            params![streak, id],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 2)
            .unwrap()
            .and_hms_opt(10, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut patient = Patient::new("Maria Petrova".into(), ts()).with_targets(135, 85);
        patient.phone = Some("+7 900 000-00-00".into());
        patient.doctor_code = Some("123456".into());

        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved, patient);
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_patient("nope").unwrap().is_none());
    }

    #[test]
    fn test_list_by_role() {
        let db = setup_db();

        db.insert_patient(&Patient::new("Zoe".into(), ts())).unwrap();
        db.insert_patient(&Patient::new("Adam".into(), ts())).unwrap();
        db.insert_patient(&Patient::new_doctor("Dr. Karpov".into(), "123456".into(), ts()))
            .unwrap();

        let patients = db.list_patients(Role::Patient).unwrap();
        let names: Vec<_> = patients.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Adam", "Zoe"]);

        let doctors = db.list_patients(Role::Doctor).unwrap();
        assert_eq!(doctors.len(), 1);
    }

    #[test]
    fn test_find_doctor_by_code() {
        let db = setup_db();

        let doctor = Patient::new_doctor("Dr. Karpov".into(), "123456".into(), ts());
        db.insert_patient(&doctor).unwrap();

        // A patient carrying the same code is not a doctor.
        let mut linked = Patient::new("Ivan".into(), ts());
        linked.doctor_code = Some("123456".into());
        db.insert_patient(&linked).unwrap();

        let found = db.find_doctor_by_code("123456").unwrap().unwrap();
        assert_eq!(found.id, doctor.id);
        assert!(db.find_doctor_by_code("000000").unwrap().is_none());
    }

    #[test]
    fn test_update_streak() {
        let db = setup_db();
        let patient = Patient::new("Ivan".into(), ts());
        db.insert_patient(&patient).unwrap();

        assert!(db.update_patient_streak(&patient.id, 6).unwrap());
        assert_eq!(db.get_patient(&patient.id).unwrap().unwrap().streak, 6);
        assert!(!db.update_patient_streak("ghost", 1).unwrap());
    }
}
