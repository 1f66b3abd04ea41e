use std::fmt;

use serde::{Deserialize, Serialize};

/// Adherence floor for a low-risk patient.
pub const LOW_RISK_ADHERENCE: u32 = 80;
/// Adherence floor for a medium-risk patient.
pub const MEDIUM_RISK_ADHERENCE: u32 = 60;
/// Systolic reading at which a patient can no longer be low risk.
pub const HIGH_SYSTOLIC: i32 = 140;

/// Coarse patient risk classification shown on the doctor dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a patient from 30-day adherence and the latest systolic reading.
///
/// A missing reading never raises the level. An elevated reading only keeps a
/// well-adherent patient out of `Low`.
pub fn risk_level(adherence_pct: u32, latest_systolic: Option<i32>) -> RiskLevel {
    let bp_ok = latest_systolic.map_or(true, |sys| sys < HIGH_SYSTOLIC);
    if adherence_pct >= LOW_RISK_ADHERENCE && bp_ok {
        RiskLevel::Low
    } else if adherence_pct >= MEDIUM_RISK_ADHERENCE {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}
