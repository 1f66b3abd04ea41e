//! Event-log CSV export and the latest-events feed.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{escape_csv, ExportError, ExportMetadata, ExportResult, Exporter};
use crate::analytics::AnalyticsError;
use crate::clock::Clock;
use crate::models::Event;

pub const EVENT_CSV_HEADER: &str = "timestamp,event_type,medication_id,metadata";
/// Default size of the latest-events feed.
pub const LATEST_EVENTS_LIMIT: usize = 20;

/// Render events as CSV in the order given.
pub fn events_to_csv(events: &[Event]) -> String {
    let mut csv = String::new();
    csv.push_str(EVENT_CSV_HEADER);
    csv.push('\n');

    for event in events {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            escape_csv(event.event_type.as_str()),
            escape_csv(event.medication_id.as_deref().unwrap_or("")),
            escape_csv(&event.metadata_json()),
        ));
    }

    csv
}

/// A patient's full event log as CSV, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogExport {
    pub metadata: ExportMetadata,
    pub patient_id: String,
    pub patient_name: String,
    /// Data rows, header excluded
    pub row_count: usize,
    pub csv: String,
}

impl EventLogExport {
    /// Suggested download name.
    pub fn file_name(&self) -> String {
        format!("neurokeep_{}_events.csv", self.patient_name)
    }
}

/// The most recent events across all patients, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestEventsFeed {
    pub metadata: ExportMetadata,
    pub events: Vec<Event>,
}

impl LatestEventsFeed {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a, C: Clock + ?Sized> Exporter<'a, C> {
    /// Export every event of a patient.
    pub fn export_events_csv(&self, patient_id: &str) -> ExportResult<EventLogExport> {
        let (patient, events) = self.db.read_snapshot(|db| {
            let patient = db
                .get_patient(patient_id)?
                .ok_or_else(|| AnalyticsError::PatientNotFound(patient_id.to_string()))?;
            Ok::<_, ExportError>((patient, db.all_events(patient_id)?))
        })?;

        let csv = events_to_csv(&events);
        info!(patient_id, rows = events.len(), "exported event log");

        Ok(EventLogExport {
            metadata: ExportMetadata::for_content(&csv, self.clock.now()),
            patient_id: patient.id,
            patient_name: patient.name,
            row_count: events.len(),
            csv,
        })
    }

    /// The `limit` most recent events across all patients.
    pub fn latest_events(&self, limit: usize) -> ExportResult<LatestEventsFeed> {
        let events = self.db.latest_events(limit)?;
        let content = serde_json::to_string(&events)?;

        Ok(LatestEventsFeed {
            metadata: ExportMetadata::for_content(&content, self.clock.now()),
            events,
        })
    }
}
