//! CEO daily log record.
//!
//! Logs are addressed by calendar date; the store keeps at most one log per
//! date through `StateStore::upsert_log_by_date`.

use super::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DailyLogId = Uuid;

/// Activity counters recorded for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogMetrics {
    pub calls_made: u32,
    pub emails_sent: u32,
    pub meetings: u32,
    pub revenue_today: f64,
    pub expenses_today: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub log_id: DailyLogId,
    pub date: NaiveDate,
    #[serde(default)]
    pub top_priorities: Vec<String>,
    #[serde(default)]
    pub wins: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub metrics: LogMetrics,
    #[serde(default)]
    pub notes: String,
}

impl DailyLog {
    /// Creates an empty log for `date` with a fresh id.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            log_id: Uuid::new_v4(),
            date,
            top_priorities: Vec::new(),
            wins: Vec::new(),
            blockers: Vec::new(),
            metrics: LogMetrics::default(),
            notes: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("revenueToday", self.metrics.revenue_today),
            ("expensesToday", self.metrics.expenses_today),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidMetric { field, value });
            }
        }
        Ok(())
    }
}

/// Splits comma-separated form input into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{split_list, DailyLog};
    use crate::model::ValidationError;
    use chrono::NaiveDate;

    #[test]
    fn negative_money_metrics_are_rejected() {
        let mut log = DailyLog::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert!(log.validate().is_ok());

        log.metrics.expenses_today = -10.0;
        assert!(matches!(
            log.validate(),
            Err(ValidationError::InvalidMetric {
                field: "expensesToday",
                ..
            })
        ));
    }

    #[test]
    fn split_list_keeps_order_and_drops_blanks() {
        assert_eq!(
            split_list("Close Blackline, ,Refine outreach"),
            vec!["Close Blackline".to_string(), "Refine outreach".to_string()]
        );
    }
}
