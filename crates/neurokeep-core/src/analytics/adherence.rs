//! Day-bucketed adherence series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{require_days, round_half_even, trailing_days, AnalyticsResult};
use crate::db::EventStore;
use crate::models::EventType;

/// Adherence for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAdherence {
    pub date: NaiveDate,
    /// Confirmations that day, capped at `total`
    pub taken: u32,
    /// Number of medications prescribed
    pub total: u32,
}

impl DayAdherence {
    /// Every medication was confirmed at least once.
    pub fn is_full(&self) -> bool {
        self.total > 0 && self.taken >= self.total
    }
}

/// Adherence for each of the `n_days` days ending at `today`, oldest first.
///
/// A patient without medications has no denominator and yields an empty
/// series. Confirmations are counted across all medications and capped at the
/// medication count.
pub fn adherence_series<S: EventStore + ?Sized>(
    store: &S,
    patient_id: &str,
    today: NaiveDate,
    n_days: u32,
) -> AnalyticsResult<Vec<DayAdherence>> {
    require_days(n_days)?;

    let total = store.list_medications(patient_id)?.len() as u32;
    if total == 0 {
        return Ok(Vec::new());
    }

    trailing_days(today, n_days)
        .map(|date| {
            let confirmed = store.count_events(patient_id, &EventType::DoseConfirmed, date)?;
            Ok(DayAdherence {
                date,
                taken: confirmed.min(total),
                total,
            })
        })
        .collect()
}

/// Percentage of fully adherent days, rounded. An empty series scores 0.
pub fn adherence_pct(series: &[DayAdherence]) -> u32 {
    let full = series.iter().filter(|day| day.is_full()).count();
    let pct = full as f64 / series.len().max(1) as f64 * 100.0;
    round_half_even(pct) as u32
}
