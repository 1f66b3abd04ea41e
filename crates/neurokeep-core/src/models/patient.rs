//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Default systolic target set at onboarding (mmHg).
pub const DEFAULT_TARGET_SYSTOLIC: i32 = 140;
/// Default diastolic target set at onboarding (mmHg).
pub const DEFAULT_TARGET_DIASTOLIC: i32 = 90;

/// Account role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            other => Err(ModelError::InvalidRole(other.to_string())),
        }
    }
}

/// A patient (or doctor) account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID
    pub id: String,
    /// Display name
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Role,
    /// Cached streak; rewritten after every confirmed dose
    pub streak: u32,
    /// Systolic target (mmHg)
    pub bp_target_systolic: i32,
    /// Diastolic target (mmHg)
    pub bp_target_diastolic: i32,
    /// Doctor linkage code. For doctors this is their own code.
    pub doctor_code: Option<String>,
    /// Creation timestamp (local civil time)
    pub created_at: NaiveDateTime,
}

impl Patient {
    /// Create a new patient with default blood-pressure targets.
    pub fn new(name: String, created_at: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            phone: None,
            email: None,
            role: Role::Patient,
            streak: 0,
            bp_target_systolic: DEFAULT_TARGET_SYSTOLIC,
            bp_target_diastolic: DEFAULT_TARGET_DIASTOLIC,
            doctor_code: None,
            created_at,
        }
    }

    /// Create a doctor account identified by its linkage code.
    pub fn new_doctor(name: String, doctor_code: String, created_at: NaiveDateTime) -> Self {
        Self {
            role: Role::Doctor,
            doctor_code: Some(doctor_code),
            ..Self::new(name, created_at)
        }
    }

    /// Set blood-pressure targets.
    pub fn with_targets(mut self, systolic: i32, diastolic: i32) -> Self {
        self.bp_target_systolic = systolic;
        self.bp_target_diastolic = diastolic;
        self
    }

    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_patient_defaults() {
        let patient = Patient::new("Anna".into(), ts());
        assert_eq!(patient.role, Role::Patient);
        assert_eq!(patient.bp_target_systolic, 140);
        assert_eq!(patient.bp_target_diastolic, 90);
        assert_eq!(patient.streak, 0);
        assert_eq!(patient.id.len(), 36); // UUID format
    }

    #[test]
    fn test_new_doctor() {
        let doctor = Patient::new_doctor("Dr. Karpov".into(), "123456".into(), ts());
        assert!(doctor.is_doctor());
        assert_eq!(doctor.doctor_code.as_deref(), Some("123456"));
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(Role::Patient.to_string(), "patient");
        assert!("nurse".parse::<Role>().is_err());
    }
}
