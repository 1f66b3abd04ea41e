//! Medication and dosing-window models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{ModelError, ModelResult};

/// Daily time-of-day interval in which a dose is expected.
///
/// Bounds are `HH:MM` 24-hour strings; `start <= end` lexicographically, so a
/// window never wraps past midnight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DosingWindow {
    pub start: String,
    pub end: String,
}

impl DosingWindow {
    /// Validate and build a window.
    pub fn new(start: &str, end: &str) -> ModelResult<Self> {
        if !is_hh_mm(start) {
            return Err(ModelError::InvalidWindow(format!("bad start time '{}'", start)));
        }
        if !is_hh_mm(end) {
            return Err(ModelError::InvalidWindow(format!("bad end time '{}'", end)));
        }
        if start > end {
            return Err(ModelError::InvalidWindow(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// Whether `now_time` (`HH:MM`) falls inside the window, inclusive.
    pub fn contains(&self, now_time: &str) -> bool {
        crate::analytics::is_within_window(&self.start, &self.end, now_time)
    }
}

/// Named windows offered during onboarding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowPreset {
    Morning,
    Afternoon,
    Evening,
}

impl WindowPreset {
    /// Resolve a preset by name. Unknown names fall back to the morning window.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "afternoon" => WindowPreset::Afternoon,
            "evening" => WindowPreset::Evening,
            _ => WindowPreset::Morning,
        }
    }

    pub fn bounds(&self) -> (&'static str, &'static str) {
        match self {
            WindowPreset::Morning => ("08:00", "10:00"),
            WindowPreset::Afternoon => ("14:00", "16:00"),
            WindowPreset::Evening => ("20:00", "22:00"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindowPreset::Morning => "Morning 8-10",
            WindowPreset::Afternoon => "Afternoon 14-16",
            WindowPreset::Evening => "Evening 20-22",
        }
    }

    pub fn window(&self) -> DosingWindow {
        let (start, end) = self.bounds();
        DosingWindow {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// A prescribed medication. Belongs to exactly one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Local UUID
    pub id: String,
    /// Owning patient ID
    pub patient_id: String,
    /// Drug name (e.g., "Enalapril")
    pub drug_name: String,
    /// Free-form dosage (e.g., "10mg")
    pub dosage: String,
    /// Daily dosing window
    pub window: DosingWindow,
    pub created_at: NaiveDateTime,
}

impl Medication {
    pub fn new(
        patient_id: String,
        drug_name: String,
        dosage: String,
        window: DosingWindow,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            drug_name,
            dosage,
            window,
            created_at,
        }
    }

    /// One-line description used in reports: `Enalapril 10mg (08:00–10:00)`.
    pub fn describe(&self) -> String {
        format!(
            "{} {} ({}–{})",
            self.drug_name, self.dosage, self.window.start, self.window.end
        )
    }
}

fn is_hh_mm(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hour < 24 && minute < 60
}
