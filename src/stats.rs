use crate::models::{DayOfWeek, UserSettings, WeeklyData};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Monday of the week containing `date` (ISO calendar, Monday = start).
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn current_week_start() -> NaiveDate {
    week_start(Utc::now().date_naive())
}

/// Weekly point target: daily target scaled by the number of work days.
/// Saturates: an extreme daily target must not poison every stats read.
pub fn apw(daily_average: u32, work_days: u32) -> u32 {
    daily_average.saturating_mul(work_days)
}

/// Week result: sum of the seven daily counters, 0 when no row exists.
pub fn week_result(week: Option<&WeeklyData>) -> u32 {
    week.map(WeeklyData::total).unwrap_or(0)
}

/// Sums across the whole routine set. Recomputed on every read, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_ap: u32,
    pub total_apw: u32,
    pub total_wr: u32,
    pub per_day: [u32; 7],
}

pub fn totals<'a, I>(items: I, work_days: u32) -> Totals
where
    I: IntoIterator<Item = (u32, Option<&'a WeeklyData>)>,
{
    let mut out = Totals::default();
    for (daily_average, week) in items {
        out.total_ap = out.total_ap.saturating_add(daily_average);
        out.total_apw = out.total_apw.saturating_add(apw(daily_average, work_days));
        out.total_wr = out.total_wr.saturating_add(week_result(week));
        if let Some(week) = week {
            for (i, day) in DayOfWeek::ALL.into_iter().enumerate() {
                out.per_day[i] = out.per_day[i].saturating_add(week.day(day));
            }
        }
    }
    out
}

/// Numbers for the weekly stats panel, all derived from settings + totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekStats {
    pub off_hours_daily: u32,
    pub work_hours_week: u32,
    pub capacity_left: u32,
    pub avg_per_day: f64,
}

pub fn week_stats(settings: &UserSettings, totals: &Totals) -> WeekStats {
    let avg = if settings.available_days > 0 {
        totals.total_apw as f64 / settings.available_days as f64
    } else {
        0.0
    };
    WeekStats {
        off_hours_daily: 24 - settings.work_hours_day,
        work_hours_week: settings.work_hours_day * settings.work_days,
        // floored at 0 for display
        capacity_left: totals.total_ap.saturating_sub(totals.total_apw),
        avg_per_day: (avg * 10.0).round() / 10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn settings(available: u32, work: u32, hours: u32) -> UserSettings {
        let now = Utc::now();
        UserSettings {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            available_days: available,
            work_days: work,
            work_hours_day: hours,
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn week_start_is_monday() {
        // 2026-08-25 is a Tuesday
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(
            week_start(tuesday),
            NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
        );
        // Sunday still maps back to the preceding Monday
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        assert_eq!(
            week_start(sunday),
            NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
        );
        let monday = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn apw_and_week_result_scenario() {
        // settings {available:7, work:5, hours:8}; target 2/day => apw 10
        assert_eq!(apw(2, 5), 10);

        let mut week = WeeklyData::zeroed(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 8, 24).unwrap(),
        );
        week.monday = 2;
        week.tuesday = 3;
        assert_eq!(week_result(Some(&week)), 5);
        assert_eq!(week_result(None), 0);
        // 5 of 10 is 50% of target
        assert_eq!(week_result(Some(&week)) * 100 / apw(2, 5), 50);
    }

    #[test]
    fn extreme_targets_saturate_instead_of_overflowing() {
        assert_eq!(apw(2_000_000_000, 7), u32::MAX);
        assert_eq!(apw(u32::MAX, 1), u32::MAX);

        let totals = totals([(u32::MAX, None), (u32::MAX, None)], 7);
        assert_eq!(totals.total_ap, u32::MAX);
        assert_eq!(totals.total_apw, u32::MAX);
    }

    #[test]
    fn totals_sum_over_all_routines() {
        let week_start = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let mut a = WeeklyData::zeroed(Uuid::new_v4(), week_start);
        a.monday = 2;
        a.friday = 1;
        let mut b = WeeklyData::zeroed(Uuid::new_v4(), week_start);
        b.monday = 1;
        b.sunday = 4;

        let totals = totals([(2, Some(&a)), (3, Some(&b)), (1, None)], 5);
        assert_eq!(totals.total_ap, 6);
        assert_eq!(totals.total_apw, 30);
        assert_eq!(totals.total_wr, 8);
        assert_eq!(totals.per_day, [3, 0, 0, 0, 1, 0, 4]);
    }

    #[test]
    fn week_stats_panel_numbers() {
        let settings = settings(7, 5, 8);
        let totals = Totals {
            total_ap: 6,
            total_apw: 30,
            total_wr: 8,
            per_day: [0; 7],
        };
        let stats = week_stats(&settings, &totals);
        assert_eq!(stats.off_hours_daily, 16);
        assert_eq!(stats.work_hours_week, 40);
        // 6 - 30 would be negative; display floors at 0
        assert_eq!(stats.capacity_left, 0);
        assert_eq!(stats.avg_per_day, 4.3);
    }
}
