//! Append-only event log model.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event-type tag.
///
/// Unknown tags are preserved verbatim in [`EventType::Other`] and never
/// counted by the aggregations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    DoseConfirmed,
    DoseSkipped,
    ReminderSent,
    BpLogged,
    DashboardOpened,
    OnboardingCompleted,
    DoctorPortalViewed,
    PdfExported,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::DoseConfirmed => "dose_confirmed",
            EventType::DoseSkipped => "dose_skipped",
            EventType::ReminderSent => "reminder_sent",
            EventType::BpLogged => "bp_logged",
            EventType::DashboardOpened => "dashboard_opened",
            EventType::OnboardingCompleted => "onboarding_completed",
            EventType::DoctorPortalViewed => "doctor_portal_viewed",
            EventType::PdfExported => "pdf_exported",
            EventType::Other(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "dose_confirmed" => EventType::DoseConfirmed,
            "dose_skipped" => EventType::DoseSkipped,
            "reminder_sent" => EventType::ReminderSent,
            "bp_logged" => EventType::BpLogged,
            "dashboard_opened" => EventType::DashboardOpened,
            "onboarding_completed" => EventType::OnboardingCompleted,
            "doctor_portal_viewed" => EventType::DoctorPortalViewed,
            "pdf_exported" => EventType::PdfExported,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        EventType::from_tag(&tag)
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        event_type.as_str().to_string()
    }
}

/// An immutable fact in the event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Local UUID
    pub id: String,
    /// Owning patient; `None` for system-level events
    pub patient_id: Option<String>,
    pub medication_id: Option<String>,
    pub event_type: EventType,
    /// Local civil timestamp
    pub timestamp: NaiveDateTime,
    /// Opaque key-value payload
    pub metadata: Map<String, Value>,
}

impl Event {
    /// Create an event for a patient.
    pub fn new(patient_id: &str, event_type: EventType, timestamp: NaiveDateTime) -> Self {
        Self {
            patient_id: Some(patient_id.to_string()),
            ..Self::system(event_type, timestamp)
        }
    }

    /// Create a system-level event with no patient attached.
    pub fn system(event_type: EventType, timestamp: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: None,
            medication_id: None,
            event_type,
            timestamp,
            metadata: Map::new(),
        }
    }

    pub fn with_medication(mut self, medication_id: &str) -> Self {
        self.medication_id = Some(medication_id.to_string());
        self
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Seconds between reminder and confirmation, when recorded.
    pub fn time_to_confirm_seconds(&self) -> Option<u64> {
        self.metadata
            .get("time_to_confirm_seconds")
            .and_then(Value::as_u64)
    }

    /// Metadata serialized as a JSON object string.
    pub fn metadata_json(&self) -> String {
        Value::Object(self.metadata.clone()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(8, 4, 0)
            .unwrap()
    }

    #[test]
    fn test_tag_round_trip() {
        for tag in [
            "dose_confirmed",
            "dose_skipped",
            "reminder_sent",
            "bp_logged",
            "dashboard_opened",
            "onboarding_completed",
            "doctor_portal_viewed",
            "pdf_exported",
        ] {
            let event_type = EventType::from_tag(tag);
            assert!(!matches!(event_type, EventType::Other(_)), "{}", tag);
            assert_eq!(event_type.as_str(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_opaque() {
        let event_type = EventType::from_tag("refill_requested");
        assert_eq!(event_type, EventType::Other("refill_requested".into()));
        assert_eq!(event_type.to_string(), "refill_requested");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let json = serde_json::to_string(&EventType::BpLogged).unwrap();
        assert_eq!(json, "\"bp_logged\"");
        let parsed: EventType = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(parsed, EventType::Other("something_new".into()));
    }

    #[test]
    fn test_metadata_accessors() {
        let event = Event::new("p1", EventType::DoseConfirmed, ts())
            .with_medication("m1")
            .with_meta("time_to_confirm_seconds", 240);
        assert_eq!(event.time_to_confirm_seconds(), Some(240));
        assert_eq!(event.metadata_json(), r#"{"time_to_confirm_seconds":240}"#);

        let system = Event::system(EventType::DoctorPortalViewed, ts());
        assert!(system.patient_id.is_none());
        assert_eq!(system.time_to_confirm_seconds(), None);
        assert_eq!(system.metadata_json(), "{}");
    }
}
