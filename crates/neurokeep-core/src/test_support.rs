//! Shared fixtures for unit tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::db::Database;
use crate::models::{
    BpLog, BpReadingInput, Event, EventType, Medication, Patient, WindowPreset,
};

/// "Today" for every unit-test fixture.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

/// `days_ago` days before today at the given time.
pub fn at(days_ago: i64, hour: u32, minute: u32) -> NaiveDateTime {
    (today() - Duration::days(days_ago))
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// In-memory database holding one patient.
pub struct Fixture {
    pub db: Database,
    pub patient: Patient,
}

impl Fixture {
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::new("Ivan Ivanov".into(), at(60, 9, 0));
        db.insert_patient(&patient).unwrap();
        Self { db, patient }
    }

    pub fn add_medication(&self, drug_name: &str) -> Medication {
        let med = Medication::new(
            self.patient.id.clone(),
            drug_name.into(),
            "10mg".into(),
            WindowPreset::Morning.window(),
            at(60, 9, 0),
        );
        self.db.insert_medication(&med).unwrap();
        med
    }

    pub fn confirm(&self, days_ago: i64, hour: u32) {
        self.log(EventType::DoseConfirmed, days_ago, hour);
    }

    pub fn log(&self, event_type: EventType, days_ago: i64, hour: u32) {
        let event = Event::new(&self.patient.id, event_type, at(days_ago, hour, 0));
        self.db.append_event(&event).unwrap();
    }

    pub fn reading(&self, days_ago: i64, hour: u32, systolic: i32, diastolic: i32) {
        let log = BpLog::new(
            &self.patient.id,
            BpReadingInput::new(systolic, diastolic),
            at(days_ago, hour, 0),
        );
        self.db.insert_bp_log(&log).unwrap();
    }
}
