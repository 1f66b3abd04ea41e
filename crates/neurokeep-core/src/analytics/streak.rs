//! Consecutive-day confirmation streak.

use chrono::{Duration, NaiveDate};

use super::AnalyticsResult;
use crate::db::EventStore;
use crate::models::EventType;

/// How far back the streak walk looks. Longer streaks report this value.
pub const STREAK_LOOKBACK_DAYS: u32 = 90;

/// Days in a row, ending today, with at least one `dose_confirmed` event.
///
/// Any confirmation qualifies a day, regardless of how many medications the
/// patient takes. A day without confirmations (including today) ends the walk.
pub fn current_streak<S: EventStore + ?Sized>(
    store: &S,
    patient_id: &str,
    today: NaiveDate,
) -> AnalyticsResult<u32> {
    let mut streak = 0;
    for offset in 0..STREAK_LOOKBACK_DAYS {
        let day = today - Duration::days(i64::from(offset));
        if store.count_events(patient_id, &EventType::DoseConfirmed, day)? == 0 {
            break;
        }
        streak += 1;
    }
    Ok(streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{today, Fixture};

    #[test]
    fn test_no_confirmations() {
        let fx = Fixture::new();
        fx.add_medication("Enalapril");
        assert_eq!(current_streak(&fx.db, &fx.patient.id, today()).unwrap(), 0);
    }

    #[test]
    fn test_counts_until_gap() {
        let fx = Fixture::new();
        for days_ago in 0..4 {
            fx.confirm(days_ago, 8);
        }
        // Gap on day 4, older history must not count.
        for days_ago in 5..10 {
            fx.confirm(days_ago, 8);
        }
        assert_eq!(current_streak(&fx.db, &fx.patient.id, today()).unwrap(), 4);
    }

    #[test]
    fn test_today_missing_breaks_streak() {
        let fx = Fixture::new();
        for days_ago in 1..6 {
            fx.confirm(days_ago, 8);
        }
        assert_eq!(current_streak(&fx.db, &fx.patient.id, today()).unwrap(), 0);
    }

    #[test]
    fn test_any_confirmation_qualifies() {
        let fx = Fixture::new();
        fx.add_medication("Enalapril");
        fx.add_medication("Amlodipine");
        // Only one of two medications confirmed each day.
        fx.confirm(0, 8);
        fx.confirm(1, 8);

        assert_eq!(current_streak(&fx.db, &fx.patient.id, today()).unwrap(), 2);
    }

    #[test]
    fn test_skips_do_not_count() {
        let fx = Fixture::new();
        fx.confirm(0, 8);
        fx.log(EventType::DoseSkipped, 1, 9);
        assert_eq!(current_streak(&fx.db, &fx.patient.id, today()).unwrap(), 1);
    }

    #[test]
    fn test_bounded_at_lookback() {
        let fx = Fixture::new();
        for days_ago in 0..120 {
            fx.confirm(days_ago, 8);
        }
        assert_eq!(
            current_streak(&fx.db, &fx.patient.id, today()).unwrap(),
            STREAK_LOOKBACK_DAYS
        );
    }
}
