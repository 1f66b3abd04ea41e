//! Patient report: the content a printable report is rendered from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ExportMetadata, ExportResult, Exporter};
use crate::analytics::{
    adherence_pct, adherence_series, bp_series, AnalyticsError, BpDay, BpTrendStats,
    BP_TREND_DAYS, REPORT_DAYS,
};
use crate::clock::Clock;
use crate::models::{Event, EventType};

/// Report body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientReport {
    pub patient_id: String,
    pub patient_name: String,
    pub report_date: NaiveDate,
    /// `"{drug} {dosage} ({start}–{end})"` per medication
    pub medications: Vec<String>,
    /// 30-day adherence percentage
    pub adherence_pct: u32,
    /// 7-day table, oldest first
    pub bp_table: Vec<BpDay>,
    pub bp_stats: BpTrendStats,
}

/// Report with export metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientReportExport {
    pub metadata: ExportMetadata,
    pub report: PatientReport,
}

impl PatientReportExport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Suggested download name.
    pub fn file_name(&self) -> String {
        format!("neurokeep_report_{}.json", self.report.patient_name)
    }
}

impl<'a, C: Clock + ?Sized> Exporter<'a, C> {
    /// Build a patient's report and record a `pdf_exported` event.
    ///
    /// The digest covers the compact JSON of the report body.
    pub fn export_patient_report(&self, patient_id: &str) -> ExportResult<PatientReportExport> {
        let now = self.clock.now();
        let today = now.date();

        let report = self.db.read_snapshot(|db| {
            let patient = db
                .get_patient(patient_id)?
                .ok_or_else(|| AnalyticsError::PatientNotFound(patient_id.to_string()))?;
            let medications = db
                .list_medications(patient_id)?
                .iter()
                .map(|m| m.describe())
                .collect();
            let adherence = adherence_series(db, patient_id, today, REPORT_DAYS)?;
            let bp_table = bp_series(db, patient_id, today, BP_TREND_DAYS)?;

            Ok::<_, AnalyticsError>(PatientReport {
                patient_id: patient.id,
                patient_name: patient.name,
                report_date: today,
                medications,
                adherence_pct: adherence_pct(&adherence),
                bp_stats: BpTrendStats::from_series(&bp_table),
                bp_table,
            })
        })?;

        let content = serde_json::to_string(&report)?;
        let metadata = ExportMetadata::for_content(&content, now);

        self.db
            .append_event(&Event::new(patient_id, EventType::PdfExported, now))?;
        info!(patient_id, "exported patient report");

        Ok(PatientReportExport { metadata, report })
    }
}
