//! Blood-pressure reading models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{ModelError, ModelResult};

/// Context tags offered when logging a reading, with display labels.
pub const BP_CONTEXTS: [(&str, &str); 6] = [
    ("normal", "Normal"),
    ("exercise", "After exercise"),
    ("stressed", "Stressed"),
    ("coffee", "After coffee"),
    ("salt", "Salty meal"),
    ("sleep", "Poor sleep (<6h)"),
];

/// Context used when none is given.
pub const DEFAULT_BP_CONTEXT: &str = "normal";

/// An immutable blood-pressure reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BpLog {
    /// Local UUID
    pub id: String,
    pub patient_id: String,
    /// Systolic pressure (mmHg)
    pub systolic: i32,
    /// Diastolic pressure (mmHg)
    pub diastolic: i32,
    /// Free-form context tag (see [`BP_CONTEXTS`])
    pub context: String,
    pub notes: Option<String>,
    /// Local civil timestamp
    pub timestamp: NaiveDateTime,
}

impl BpLog {
    pub fn new(patient_id: &str, reading: BpReadingInput, timestamp: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            systolic: reading.systolic,
            diastolic: reading.diastolic,
            context: reading.context,
            notes: reading.notes,
            timestamp,
        }
    }

    /// `"{systolic}/{diastolic}"`
    pub fn display(&self) -> String {
        format!("{}/{}", self.systolic, self.diastolic)
    }
}

/// A validated reading that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpReadingInput {
    pub systolic: i32,
    pub diastolic: i32,
    pub context: String,
    pub notes: Option<String>,
}

impl BpReadingInput {
    /// Build from already-typed values.
    pub fn new(systolic: i32, diastolic: i32) -> Self {
        Self {
            systolic,
            diastolic,
            context: DEFAULT_BP_CONTEXT.to_string(),
            notes: None,
        }
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = context.to_string();
        self
    }

    /// Parse raw form fields.
    ///
    /// Non-integer or non-positive pressures are rejected; an empty context
    /// becomes [`DEFAULT_BP_CONTEXT`] and blank notes become `None`.
    pub fn parse(
        systolic: &str,
        diastolic: &str,
        context: Option<&str>,
        notes: Option<&str>,
    ) -> ModelResult<Self> {
        let systolic = parse_pressure("systolic", systolic)?;
        let diastolic = parse_pressure("diastolic", diastolic)?;

        let context = context
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_BP_CONTEXT)
            .to_string();
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            systolic,
            diastolic,
            context,
            notes,
        })
    }
}

fn parse_pressure(field: &str, raw: &str) -> ModelResult<i32> {
    let value: i32 = raw
        .trim()
        .parse()
        .map_err(|_| ModelError::InvalidReading(format!("{} must be an integer, got '{}'", field, raw)))?;
    if value <= 0 {
        return Err(ModelError::InvalidReading(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    Ok(value)
}
