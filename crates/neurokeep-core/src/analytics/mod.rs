//! Adherence, streak, blood-pressure trend and risk analytics.
//!
//! The free functions in this module are pure computations over an
//! [`EventStore`] and an explicit `today`. [`Analytics`] binds them to a store
//! and a [`Clock`] and runs each public operation inside one store snapshot.
//!
//! Two definitions of a "good day" coexist on purpose:
//!
//! - adherence counts a day only when confirmations cover every medication;
//! - the streak counts a day as soon as any dose is confirmed.

mod adherence;
mod bp_trend;
mod risk;
mod streak;
mod window;

pub use adherence::*;
pub use bp_trend::*;
pub use risk::*;
pub use streak::*;
pub use window::*;

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::clock::Clock;
use crate::db::{DbError, EventStore};
use crate::models::Medication;

/// Analytics errors.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Event store unavailable: {0}")]
    StoreUnavailable(#[from] DbError),

    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Adherence window used by the patient dashboard.
pub const DASHBOARD_DAYS: u32 = 7;
/// Adherence window used by doctor-facing reports.
pub const REPORT_DAYS: u32 = 30;

/// The `n_days` calendar days ending at `today`, oldest first.
pub(crate) fn trailing_days(today: NaiveDate, n_days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..n_days)
        .rev()
        .map(move |offset| today - Duration::days(i64::from(offset)))
}

pub(crate) fn require_days(n_days: u32) -> AnalyticsResult<()> {
    if n_days == 0 {
        return Err(AnalyticsError::InvalidArgument(
            "n_days must be at least 1".into(),
        ));
    }
    Ok(())
}

/// Round half to even, matching the rounding the reports have always used.
pub(crate) fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Analytics bound to a store and a clock.
pub struct Analytics<'a, S, C: ?Sized> {
    store: &'a S,
    clock: &'a C,
}

impl<'a, S: EventStore, C: Clock + ?Sized> Analytics<'a, S, C> {
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Today's civil date according to the clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Per-day adherence over the last `n_days` days.
    pub fn adherence_series(
        &self,
        patient_id: &str,
        n_days: u32,
    ) -> AnalyticsResult<Vec<DayAdherence>> {
        let today = self.today();
        self.store
            .snapshot(|store| adherence_series(store, patient_id, today, n_days))
    }

    /// Adherence percentage over the last `n_days` days.
    pub fn adherence_pct(&self, patient_id: &str, n_days: u32) -> AnalyticsResult<u32> {
        Ok(adherence_pct(&self.adherence_series(patient_id, n_days)?))
    }

    /// Consecutive days with a confirmed dose, ending today.
    pub fn current_streak(&self, patient_id: &str) -> AnalyticsResult<u32> {
        let today = self.today();
        self.store
            .snapshot(|store| current_streak(store, patient_id, today))
    }

    /// Day-bucketed blood-pressure series over the last `n_days` days.
    pub fn bp_series(&self, patient_id: &str, n_days: u32) -> AnalyticsResult<Vec<BpDay>> {
        let today = self.today();
        self.store
            .snapshot(|store| bp_series(store, patient_id, today, n_days))
    }

    /// Seven-day blood-pressure series with derived statistics.
    pub fn bp_trend(&self, patient_id: &str) -> AnalyticsResult<BpTrend> {
        let series = self.bp_series(patient_id, BP_TREND_DAYS)?;
        Ok(BpTrend::from_series(series))
    }

    /// Whether the clock's current time falls inside a medication's window.
    pub fn in_dosing_window(&self, medication: &Medication) -> bool {
        medication.window.contains(&self.clock.time_of_day())
    }
}
