//! Blood-pressure trend series and derived statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require_days, round_half_even, trailing_days, AnalyticsResult};
use crate::db::EventStore;

/// Window of the trend view.
pub const BP_TREND_DAYS: u32 = 7;
/// Systolic ceiling for an in-target day (mmHg).
pub const IN_TARGET_SYSTOLIC: i32 = 135;
/// Diastolic ceiling for an in-target day (mmHg).
pub const IN_TARGET_DIASTOLIC: i32 = 85;
/// Fewest valid days for which an improvement figure is reported.
pub const MIN_IMPROVEMENT_DAYS: usize = 4;

/// The day's latest reading, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BpDay {
    pub date: NaiveDate,
    pub systolic: Option<i32>,
    pub diastolic: Option<i32>,
}

impl BpDay {
    /// Both values, when the day has a reading.
    pub fn reading(&self) -> Option<(i32, i32)> {
        Some((self.systolic?, self.diastolic?))
    }
}

/// Latest reading per day for the `n_days` days ending at `today`, oldest first.
pub fn bp_series<S: EventStore + ?Sized>(
    store: &S,
    patient_id: &str,
    today: NaiveDate,
    n_days: u32,
) -> AnalyticsResult<Vec<BpDay>> {
    require_days(n_days)?;

    trailing_days(today, n_days)
        .map(|date| {
            let latest = store.latest_bp_log(patient_id, date)?;
            Ok(BpDay {
                date,
                systolic: latest.as_ref().map(|log| log.systolic),
                diastolic: latest.as_ref().map(|log| log.diastolic),
            })
        })
        .collect()
}

/// Statistics over the valid days of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpTrendStats {
    /// Days with a reading
    pub valid_days: usize,
    /// Rounded mean systolic; `None` without valid days
    pub avg_systolic: Option<i32>,
    /// Rounded mean diastolic; `None` without valid days
    pub avg_diastolic: Option<i32>,
    /// Rounded share of valid days at or under 135/85; 0 without valid days
    pub in_target_pct: u32,
    /// Percent drop in systolic from the first half of valid days to the
    /// second, one decimal. Positive means improvement.
    pub improvement: Option<f64>,
}

impl BpTrendStats {
    pub fn from_series(series: &[BpDay]) -> Self {
        let valid: Vec<(i32, i32)> = series.iter().filter_map(BpDay::reading).collect();
        if valid.is_empty() {
            return Self {
                valid_days: 0,
                avg_systolic: None,
                avg_diastolic: None,
                in_target_pct: 0,
                improvement: None,
            };
        }

        let count = valid.len() as f64;
        let sum_sys: i64 = valid.iter().map(|&(sys, _)| i64::from(sys)).sum();
        let sum_dia: i64 = valid.iter().map(|&(_, dia)| i64::from(dia)).sum();
        let in_target = valid
            .iter()
            .filter(|&&(sys, dia)| sys <= IN_TARGET_SYSTOLIC && dia <= IN_TARGET_DIASTOLIC)
            .count();
        let systolic: Vec<i32> = valid.iter().map(|&(sys, _)| sys).collect();

        Self {
            valid_days: valid.len(),
            avg_systolic: Some(round_half_even(sum_sys as f64 / count) as i32),
            avg_diastolic: Some(round_half_even(sum_dia as f64 / count) as i32),
            in_target_pct: round_half_even(in_target as f64 / count * 100.0) as u32,
            improvement: improvement(&systolic),
        }
    }
}

/// First-half versus second-half systolic improvement.
///
/// `values` are the valid days' systolic readings, oldest first. Returns `None`
/// for fewer than [`MIN_IMPROVEMENT_DAYS`] values or a zero first-half mean.
pub fn improvement(values: &[i32]) -> Option<f64> {
    if values.len() < MIN_IMPROVEMENT_DAYS {
        return None;
    }
    let mid = values.len() / 2;
    let first = mean(&values[..mid]);
    let second = mean(&values[mid..]);
    if first == 0.0 {
        return None;
    }
    let pct = (first - second) / first * 100.0;
    // Rounds the exact binary value, so a computed 45.549999... stays 45.5
    format!("{:.1}", pct).parse().ok()
}

fn mean(values: &[i32]) -> f64 {
    values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64
}

/// A series together with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpTrend {
    pub series: Vec<BpDay>,
    pub stats: BpTrendStats,
}

impl BpTrend {
    pub fn from_series(series: Vec<BpDay>) -> Self {
        let stats = BpTrendStats::from_series(&series);
        Self { series, stats }
    }
}
