//! Assembled report records handed to rendering and export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{BpDay, BpTrend, DayAdherence, RiskLevel};
use crate::models::{BpLog, Event, Medication, Patient};

/// Shown in place of a blood-pressure value when there is no reading.
pub const BP_PLACEHOLDER: &str = "—";

/// Format an optional reading as `"{sys}/{dia}"` or the placeholder.
pub fn bp_display(reading: Option<&BpLog>) -> String {
    reading
        .map(BpLog::display)
        .unwrap_or_else(|| BP_PLACEHOLDER.to_string())
}

/// One row of the doctor dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient: Patient,
    pub medications: Vec<Medication>,
    /// 30-day adherence percentage
    pub adherence_pct: u32,
    pub latest_bp: Option<BpLog>,
    /// `"{sys}/{dia}"` or [`BP_PLACEHOLDER`]
    pub bp_display: String,
    pub risk: RiskLevel,
}

/// A medication as shown on the patient's own dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationStatus {
    pub medication: Medication,
    /// The clock's current time falls inside the dosing window
    pub in_window: bool,
    /// A confirmation for this medication exists today
    pub confirmed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDashboard {
    pub patient: Patient,
    pub date: NaiveDate,
    pub medications: Vec<MedicationStatus>,
    pub streak: u32,
    /// 7-day series, oldest first
    pub adherence: Vec<DayAdherence>,
    pub adherence_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpOverview {
    pub patient_id: String,
    pub trend: BpTrend,
    /// Newest first
    pub recent_readings: Vec<BpLog>,
    pub target_systolic: i32,
    pub target_diastolic: i32,
}

/// Doctor-facing view of one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    pub patient: Patient,
    pub medications: Vec<Medication>,
    /// 30-day series, oldest first
    pub adherence: Vec<DayAdherence>,
    pub adherence_pct: u32,
    /// 30-day series, oldest first
    pub bp_series: Vec<BpDay>,
    /// Newest first
    pub recent_events: Vec<Event>,
}
