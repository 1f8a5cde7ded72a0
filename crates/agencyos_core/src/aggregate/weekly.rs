//! Trailing-week activity rollup over daily logs.

use crate::model::daily_log::DailyLog;
use chrono::{Duration, NaiveDate};

/// Days covered by the rollup, today included.
pub const WEEK_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeeklyRollup {
    pub calls_made: u64,
    pub emails_sent: u64,
    pub meetings: u64,
    pub revenue: f64,
    pub expenses: f64,
    /// Number of logs that fell inside the window.
    pub days_logged: usize,
}

/// Sums log metrics for logs dated in `[today - 6 days, today]`.
pub fn weekly_rollup(logs: &[DailyLog], today: NaiveDate) -> WeeklyRollup {
    let window_start = today - Duration::days(WEEK_DAYS - 1);

    logs.iter()
        .filter(|log| log.date >= window_start && log.date <= today)
        .fold(WeeklyRollup::default(), |mut acc, log| {
            acc.calls_made += u64::from(log.metrics.calls_made);
            acc.emails_sent += u64::from(log.metrics.emails_sent);
            acc.meetings += u64::from(log.metrics.meetings);
            acc.revenue += log.metrics.revenue_today;
            acc.expenses += log.metrics.expenses_today;
            acc.days_logged += 1;
            acc
        })
}
