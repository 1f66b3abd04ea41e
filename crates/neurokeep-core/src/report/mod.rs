//! Report data assembly.
//!
//! Composes analytics results into the records the dashboards and exports
//! render. Every public operation of [`ReportAssembler`] reads through a single
//! store snapshot.

mod views;

pub use views::*;

use chrono::NaiveDate;
use tracing::debug;

use crate::analytics::{
    adherence_pct, adherence_series, bp_series, current_streak, risk_level, AnalyticsError,
    AnalyticsResult, BpTrend, BP_TREND_DAYS, DASHBOARD_DAYS, REPORT_DAYS,
};
use crate::clock::Clock;
use crate::db::EventStore;
use crate::models::{Patient, Role};

/// Readings listed on the blood-pressure overview.
pub const RECENT_BP_LIMIT: usize = 5;
/// Events listed on the patient detail page.
pub const RECENT_EVENTS_LIMIT: usize = 10;

/// Doctor-dashboard row for an already-loaded patient.
pub fn summarize_patient<S: EventStore + ?Sized>(
    store: &S,
    patient: Patient,
    today: NaiveDate,
) -> AnalyticsResult<PatientSummary> {
    let medications = store.list_medications(&patient.id)?;
    let pct = adherence_pct(&adherence_series(store, &patient.id, today, REPORT_DAYS)?);
    let latest_bp = store.latest_bp_reading(&patient.id)?;
    let risk = risk_level(pct, latest_bp.as_ref().map(|log| log.systolic));

    Ok(PatientSummary {
        bp_display: bp_display(latest_bp.as_ref()),
        patient,
        medications,
        adherence_pct: pct,
        latest_bp,
        risk,
    })
}

fn require_patient<S: EventStore + ?Sized>(store: &S, patient_id: &str) -> AnalyticsResult<Patient> {
    store
        .get_patient(patient_id)?
        .ok_or_else(|| AnalyticsError::PatientNotFound(patient_id.to_string()))
}

/// Report assembler bound to a store and a clock.
pub struct ReportAssembler<'a, S, C: ?Sized> {
    store: &'a S,
    clock: &'a C,
}

impl<'a, S: EventStore, C: Clock + ?Sized> ReportAssembler<'a, S, C> {
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Summary row for a single patient.
    pub fn patient_summary(&self, patient_id: &str) -> AnalyticsResult<PatientSummary> {
        let today = self.clock.today();
        self.store.snapshot(|store| {
            let patient = require_patient(store, patient_id)?;
            summarize_patient(store, patient, today)
        })
    }

    /// Summaries for every patient, ordered by name.
    pub fn doctor_dashboard(&self) -> AnalyticsResult<Vec<PatientSummary>> {
        let today = self.clock.today();
        let summaries = self.store.snapshot(|store| {
            store
                .list_patients(Role::Patient)?
                .into_iter()
                .map(|patient| summarize_patient(store, patient, today))
                .collect::<AnalyticsResult<Vec<_>>>()
        })?;
        debug!(patients = summaries.len(), "assembled doctor dashboard");
        Ok(summaries)
    }

    /// The patient's own dashboard.
    pub fn patient_dashboard(&self, patient_id: &str) -> AnalyticsResult<PatientDashboard> {
        let today = self.clock.today();
        let now_time = self.clock.time_of_day();

        self.store.snapshot(|store| {
            let patient = require_patient(store, patient_id)?;
            let confirmed = store.confirmed_medications_on(patient_id, today)?;
            let medications = store
                .list_medications(patient_id)?
                .into_iter()
                .map(|medication| MedicationStatus {
                    in_window: medication.window.contains(&now_time),
                    confirmed_today: confirmed.contains(&medication.id),
                    medication,
                })
                .collect();
            let streak = current_streak(store, patient_id, today)?;
            let adherence = adherence_series(store, patient_id, today, DASHBOARD_DAYS)?;

            Ok(PatientDashboard {
                patient,
                date: today,
                medications,
                streak,
                adherence_pct: adherence_pct(&adherence),
                adherence,
            })
        })
    }

    /// Seven-day trend, recent readings and targets.
    pub fn bp_overview(&self, patient_id: &str) -> AnalyticsResult<BpOverview> {
        let today = self.clock.today();

        self.store.snapshot(|store| {
            let patient = require_patient(store, patient_id)?;
            let series = bp_series(store, patient_id, today, BP_TREND_DAYS)?;

            Ok(BpOverview {
                patient_id: patient.id,
                trend: BpTrend::from_series(series),
                recent_readings: store.recent_bp_logs(patient_id, RECENT_BP_LIMIT)?,
                target_systolic: patient.bp_target_systolic,
                target_diastolic: patient.bp_target_diastolic,
            })
        })
    }

    /// Doctor-facing detail page.
    pub fn patient_detail(&self, patient_id: &str) -> AnalyticsResult<PatientDetail> {
        let today = self.clock.today();

        self.store.snapshot(|store| {
            let patient = require_patient(store, patient_id)?;
            let adherence = adherence_series(store, patient_id, today, REPORT_DAYS)?;

            Ok(PatientDetail {
                patient,
                medications: store.list_medications(patient_id)?,
                adherence_pct: adherence_pct(&adherence),
                adherence,
                bp_series: bp_series(store, patient_id, today, REPORT_DAYS)?,
                recent_events: store.recent_events(patient_id, RECENT_EVENTS_LIMIT)?,
            })
        })
    }
}
