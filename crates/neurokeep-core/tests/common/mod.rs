//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use neurokeep_core::db::{DbError, DbResult, EventStore};
use neurokeep_core::models::{
    BpLog, BpReadingInput, Event, EventType, Medication, Patient, Role, WindowPreset,
};

/// Saturday 2026-03-14.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

pub fn at(days_ago: i64, hour: u32, minute: u32) -> NaiveDateTime {
    (today() - Duration::days(days_ago))
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Event store held in vectors. Insertion order breaks timestamp ties.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub patients: Vec<Patient>,
    pub medications: Vec<Medication>,
    pub events: Vec<Event>,
    pub bp_logs: Vec<BpLog>,
}

impl MemoryStore {
    /// Store holding one patient named "Ivan Ivanov".
    pub fn with_patient() -> (Self, String) {
        let patient = Patient::new("Ivan Ivanov".into(), at(60, 9, 0));
        let id = patient.id.clone();
        let store = Self {
            patients: vec![patient],
            ..Self::default()
        };
        (store, id)
    }

    pub fn add_medication(&mut self, patient_id: &str, drug_name: &str) -> Medication {
        let med = Medication::new(
            patient_id.into(),
            drug_name.into(),
            "10mg".into(),
            WindowPreset::Morning.window(),
            at(60, 9, 0),
        );
        self.medications.push(med.clone());
        med
    }

    pub fn confirm(&mut self, patient_id: &str, days_ago: i64, hour: u32) {
        self.events
            .push(Event::new(patient_id, EventType::DoseConfirmed, at(days_ago, hour, 0)));
    }

    pub fn reading(&mut self, patient_id: &str, timestamp: NaiveDateTime, sys: i32, dia: i32) {
        self.bp_logs
            .push(BpLog::new(patient_id, BpReadingInput::new(sys, dia), timestamp));
    }

    fn patient_events(&self, patient_id: &str) -> Vec<(usize, &Event)> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.patient_id.as_deref() == Some(patient_id))
            .collect()
    }

    fn patient_logs(&self, patient_id: &str) -> Vec<(usize, &BpLog)> {
        let mut logs: Vec<_> = self
            .bp_logs
            .iter()
            .enumerate()
            .filter(|(_, l)| l.patient_id == patient_id)
            .collect();
        logs.sort_by_key(|(i, l)| std::cmp::Reverse((l.timestamp, *i)));
        logs
    }
}

impl EventStore for MemoryStore {
    fn count_events(
        &self,
        patient_id: &str,
        event_type: &EventType,
        date: NaiveDate,
    ) -> DbResult<u32> {
        Ok(self
            .patient_events(patient_id)
            .into_iter()
            .filter(|(_, e)| &e.event_type == event_type && e.timestamp.date() == date)
            .count() as u32)
    }

    fn latest_bp_log(&self, patient_id: &str, date: NaiveDate) -> DbResult<Option<BpLog>> {
        Ok(self
            .patient_logs(patient_id)
            .into_iter()
            .find(|(_, l)| l.timestamp.date() == date)
            .map(|(_, l)| l.clone()))
    }

    fn list_medications(&self, patient_id: &str) -> DbResult<Vec<Medication>> {
        Ok(self
            .medications
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn recent_events(&self, patient_id: &str, limit: usize) -> DbResult<Vec<Event>> {
        let mut events = self.patient_events(patient_id);
        events.sort_by_key(|(i, e)| std::cmp::Reverse((e.timestamp, *i)));
        Ok(events.into_iter().take(limit).map(|(_, e)| e.clone()).collect())
    }

    fn latest_bp_reading(&self, patient_id: &str) -> DbResult<Option<BpLog>> {
        Ok(self.patient_logs(patient_id).first().map(|(_, l)| (*l).clone()))
    }

    fn recent_bp_logs(&self, patient_id: &str, limit: usize) -> DbResult<Vec<BpLog>> {
        Ok(self
            .patient_logs(patient_id)
            .into_iter()
            .take(limit)
            .map(|(_, l)| l.clone())
            .collect())
    }

    fn confirmed_medications_on(
        &self,
        patient_id: &str,
        date: NaiveDate,
    ) -> DbResult<HashSet<String>> {
        Ok(self
            .patient_events(patient_id)
            .into_iter()
            .filter(|(_, e)| e.event_type == EventType::DoseConfirmed && e.timestamp.date() == date)
            .filter_map(|(_, e)| e.medication_id.clone())
            .collect())
    }

    fn get_patient(&self, patient_id: &str) -> DbResult<Option<Patient>> {
        Ok(self.patients.iter().find(|p| p.id == patient_id).cloned())
    }

    fn list_patients(&self, role: Role) -> DbResult<Vec<Patient>> {
        let mut patients: Vec<_> = self
            .patients
            .iter()
            .filter(|p| p.role == role)
            .cloned()
            .collect();
        patients.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(patients)
    }
}

/// Store whose every query fails as if the backing database were offline.
#[derive(Debug, Default)]
pub struct OfflineStore;

fn offline<T>() -> DbResult<T> {
    Err(DbError::Unavailable("store offline".into()))
}

impl EventStore for OfflineStore {
    fn count_events(&self, _: &str, _: &EventType, _: NaiveDate) -> DbResult<u32> {
        offline()
    }

    fn latest_bp_log(&self, _: &str, _: NaiveDate) -> DbResult<Option<BpLog>> {
        offline()
    }

    fn list_medications(&self, _: &str) -> DbResult<Vec<Medication>> {
        offline()
    }

    fn recent_events(&self, _: &str, _: usize) -> DbResult<Vec<Event>> {
        offline()
    }

    fn latest_bp_reading(&self, _: &str) -> DbResult<Option<BpLog>> {
        offline()
    }

    fn recent_bp_logs(&self, _: &str, _: usize) -> DbResult<Vec<BpLog>> {
        offline()
    }

    fn confirmed_medications_on(&self, _: &str, _: NaiveDate) -> DbResult<HashSet<String>> {
        offline()
    }

    fn get_patient(&self, _: &str) -> DbResult<Option<Patient>> {
        offline()
    }

    fn list_patients(&self, _: Role) -> DbResult<Vec<Patient>> {
        offline()
    }
}
