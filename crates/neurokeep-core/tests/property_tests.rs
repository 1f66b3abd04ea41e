//! Property-based tests for the analytics engine.

mod common;

use common::{today, MemoryStore};
use proptest::prelude::*;

use neurokeep_core::analytics::{
    adherence_pct, adherence_series, current_streak, improvement, is_within_window, risk_level,
    BpDay, BpTrendStats, RiskLevel, MIN_IMPROVEMENT_DAYS, STREAK_LOOKBACK_DAYS,
};

// ── Helpers ──────────────────────────────────────────────

fn hh_mm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn severity(level: RiskLevel) -> u8 {
    match level {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
    }
}

// ── Adherence ────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_taken_never_exceeds_total(
        medications in 0usize..4,
        confirmations in prop::collection::vec(0usize..6, 7),
    ) {
        let (mut store, id) = MemoryStore::with_patient();
        for i in 0..medications {
            store.add_medication(&id, &format!("Drug {}", i));
        }
        for (days_ago, &count) in confirmations.iter().enumerate() {
            for n in 0..count {
                store.confirm(&id, days_ago as i64, 8 + n as u32);
            }
        }

        let series = adherence_series(&store, &id, today(), 7).unwrap();
        if medications == 0 {
            prop_assert!(series.is_empty());
        } else {
            prop_assert_eq!(series.len(), 7);
            for (day, &count) in series.iter().rev().zip(&confirmations) {
                prop_assert_eq!(day.total, medications as u32);
                prop_assert!(day.taken <= day.total);
                prop_assert_eq!(day.taken, (count as u32).min(day.total));
            }
        }
        prop_assert!(adherence_pct(&series) <= 100);
    }
}

// ── Streak ───────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_streak_counts_unbroken_run(run in 0i64..120, tail in 0i64..10) {
        let (mut store, id) = MemoryStore::with_patient();
        for days_ago in 0..run {
            store.confirm(&id, days_ago, 9);
        }
        // Confirmations after the gap must not extend the streak
        for days_ago in (run + 1)..(run + 1 + tail) {
            store.confirm(&id, days_ago, 9);
        }

        let streak = current_streak(&store, &id, today()).unwrap();
        prop_assert!(streak <= STREAK_LOOKBACK_DAYS);
        prop_assert_eq!(streak, (run as u32).min(STREAK_LOOKBACK_DAYS));
    }
}

// ── Dosing window ────────────────────────────────────────

proptest! {
    #[test]
    fn prop_window_matches_minute_arithmetic(
        start in 0u32..1440,
        end in 0u32..1440,
        now in 0u32..1440,
    ) {
        let expected = start <= now && now <= end;
        prop_assert_eq!(is_within_window(&hh_mm(start), &hh_mm(end), &hh_mm(now)), expected);
    }
}

// ── Risk ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_risk_never_worsens_with_adherence(
        a in 0u32..=100,
        b in 0u32..=100,
        systolic in prop::option::of(80i32..220),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            severity(risk_level(high, systolic)) <= severity(risk_level(low, systolic))
        );
    }

    #[test]
    fn prop_missing_reading_never_raises_risk(pct in 0u32..=100, systolic in 80i32..220) {
        prop_assert!(severity(risk_level(pct, None)) <= severity(risk_level(pct, Some(systolic))));
    }
}

// ── Blood pressure ───────────────────────────────────────

proptest! {
    #[test]
    fn prop_improvement_needs_four_values(
        values in prop::collection::vec(60i32..250, 0..MIN_IMPROVEMENT_DAYS),
    ) {
        prop_assert_eq!(improvement(&values), None);
    }

    #[test]
    fn prop_improvement_sign_follows_halves(
        values in prop::collection::vec(60i32..250, MIN_IMPROVEMENT_DAYS..8),
    ) {
        let result = improvement(&values);
        prop_assert!(result.is_some());
        let mid = values.len() / 2;
        let first: i64 = values[..mid].iter().map(|&v| i64::from(v)).sum();
        let second: i64 = values[mid..].iter().map(|&v| i64::from(v)).sum();
        // Compare means without division
        let first_scaled = first * (values.len() - mid) as i64;
        let second_scaled = second * mid as i64;
        if first_scaled == second_scaled {
            prop_assert_eq!(result, Some(0.0));
        } else if first_scaled > second_scaled {
            prop_assert!(result.unwrap() >= 0.0);
        } else {
            prop_assert!(result.unwrap() <= 0.0);
        }
    }

    #[test]
    fn prop_stats_bounded(
        readings in prop::collection::vec(prop::option::of((60i32..250, 40i32..150)), 7),
    ) {
        let series: Vec<BpDay> = readings
            .iter()
            .enumerate()
            .map(|(i, reading)| BpDay {
                date: today() - chrono::Duration::days(6 - i as i64),
                systolic: reading.map(|(sys, _)| sys),
                diastolic: reading.map(|(_, dia)| dia),
            })
            .collect();
        let stats = BpTrendStats::from_series(&series);

        prop_assert_eq!(stats.valid_days, readings.iter().flatten().count());
        prop_assert!(stats.in_target_pct <= 100);
        if let Some(avg) = stats.avg_systolic {
            let min = readings.iter().flatten().map(|&(s, _)| s).min().unwrap();
            let max = readings.iter().flatten().map(|&(s, _)| s).max().unwrap();
            prop_assert!(min <= avg && avg <= max);
        } else {
            prop_assert_eq!(stats.valid_days, 0);
        }
    }
}
