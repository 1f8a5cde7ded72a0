//! Transaction rollups: range totals, monthly and per-company summaries,
//! and the monthly chart series.
//!
//! # Invariants
//! - Month keys are zero-padded `YYYY-MM`, so lexicographic order is
//!   chronological order.
//! - Cashflow always covers the full history and ignores the range bucket.

use super::{resolve_company_name, UNASSIGNED_COMPANY};
use crate::model::company::Company;
use crate::model::document::RangeBucket;
use crate::model::transaction::{Transaction, TransactionType};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Months kept by `monthly_series`.
pub const SERIES_MONTH_CAP: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeTotals {
    pub income: f64,
    pub expense: f64,
    /// `income - expense` within the range.
    pub profit: f64,
    /// Signed total over the whole history.
    pub cashflow: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowSummary {
    pub income: f64,
    pub expense: f64,
}

impl FlowSummary {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }

    fn add(&mut self, tx: &Transaction) {
        match tx.kind {
            TransactionType::Income => self.income += tx.amount,
            TransactionType::Expense => self.expense += tx.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanySummary {
    /// Resolved display name; groups companies sharing a name.
    pub company: String,
    pub flow: FlowSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub month: String,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub points: Vec<SeriesPoint>,
    /// Largest absolute value across the three series, at least 1.
    pub scale: f64,
}

/// `YYYY-MM` key of a calendar date.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Whether `date` falls inside `bucket` relative to `today`.
pub fn in_range(date: NaiveDate, bucket: RangeBucket, today: NaiveDate) -> bool {
    match bucket {
        RangeBucket::ThisMonth => date.year() == today.year() && date.month() == today.month(),
        RangeBucket::LastMonth => {
            let (year, month) = if today.month() == 1 {
                (today.year() - 1, 12)
            } else {
                (today.year(), today.month() - 1)
            };
            date.year() == year && date.month() == month
        }
        RangeBucket::YearToDate => date.year() == today.year(),
        RangeBucket::All => true,
    }
}

/// Income, expense and profit inside `bucket`, plus full-history cashflow.
pub fn range_totals(
    transactions: &[Transaction],
    bucket: RangeBucket,
    today: NaiveDate,
) -> RangeTotals {
    let mut flow = FlowSummary::default();
    let mut cashflow = 0.0;

    for tx in transactions {
        cashflow += tx.signed_amount();
        if in_range(tx.date, bucket, today) {
            flow.add(tx);
        }
    }

    RangeTotals {
        income: flow.income,
        expense: flow.expense,
        profit: flow.net(),
        cashflow,
    }
}

/// Income and expense grouped by month, ascending.
pub fn summary_by_month(transactions: &[Transaction]) -> BTreeMap<String, FlowSummary> {
    let mut by_month: BTreeMap<String, FlowSummary> = BTreeMap::new();
    for tx in transactions {
        by_month.entry(month_key(tx.date)).or_default().add(tx);
    }
    by_month
}

/// Income and expense grouped by resolved company name.
///
/// Groups appear in order of first occurrence. Unassigned and dangling
/// references share the `"Unassigned"` group.
pub fn summary_by_company(
    companies: &[Company],
    transactions: &[Transaction],
) -> Vec<CompanySummary> {
    let mut groups: Vec<CompanySummary> = Vec::new();

    for tx in transactions {
        let name = resolve_company_name(companies, tx.company_id, UNASSIGNED_COMPANY);
        let index = match groups.iter().position(|group| group.company == name) {
            Some(index) => index,
            None => {
                groups.push(CompanySummary {
                    company: name.to_string(),
                    flow: FlowSummary::default(),
                });
                groups.len() - 1
            }
        };
        groups[index].flow.add(tx);
    }

    groups
}

/// Per-month income, expense and profit for the most recent months.
pub fn monthly_series(transactions: &[Transaction]) -> MonthlySeries {
    let by_month = summary_by_month(transactions);
    let skip = by_month.len().saturating_sub(SERIES_MONTH_CAP);

    let points: Vec<SeriesPoint> = by_month
        .into_iter()
        .skip(skip)
        .map(|(month, flow)| SeriesPoint {
            month,
            income: flow.income,
            expense: flow.expense,
            profit: flow.net(),
        })
        .collect();

    let scale = points
        .iter()
        .flat_map(|point| [point.income.abs(), point.expense.abs(), point.profit.abs()])
        .fold(1.0_f64, f64::max);

    MonthlySeries { points, scale }
}

#[cfg(test)]
mod tests {
    use super::{in_range, month_key, monthly_series, summary_by_month};
    use crate::model::document::RangeBucket;
    use crate::model::transaction::{Transaction, TransactionType};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_month_wraps_across_year_boundary() {
        let today = date(2026, 1, 10);
        assert!(in_range(date(2025, 12, 31), RangeBucket::LastMonth, today));
        assert!(!in_range(date(2026, 12, 1), RangeBucket::LastMonth, today));
        assert!(!in_range(date(2025, 12, 31), RangeBucket::YearToDate, today));
    }

    #[test]
    fn month_keys_are_zero_padded_and_sort_chronologically() {
        assert_eq!(month_key(date(2026, 3, 9)), "2026-03");

        let txs = vec![
            Transaction::new(date(2026, 11, 1), TransactionType::Income, 1.0),
            Transaction::new(date(2026, 2, 1), TransactionType::Expense, 2.0),
            Transaction::new(date(2025, 12, 1), TransactionType::Income, 3.0),
        ];
        let months: Vec<_> = summary_by_month(&txs).into_keys().collect();
        assert_eq!(months, vec!["2025-12", "2026-02", "2026-11"]);
    }

    #[test]
    fn series_keeps_last_twelve_months() {
        let txs: Vec<_> = (1..=14)
            .map(|offset| {
                let year = 2025 + (offset - 1) / 12;
                let month = ((offset - 1) % 12 + 1) as u32;
                Transaction::new(date(year, month, 1), TransactionType::Income, 10.0)
            })
            .collect();

        let series = monthly_series(&txs);
        assert_eq!(series.points.len(), 12);
        assert_eq!(series.points[0].month, "2025-03");
        assert_eq!(series.points[11].month, "2026-02");
    }

    #[test]
    fn series_scale_uses_largest_absolute_value_with_floor() {
        assert_eq!(monthly_series(&[]).scale, 1.0);

        let txs = vec![
            Transaction::new(date(2026, 1, 1), TransactionType::Income, 100.0),
            Transaction::new(date(2026, 1, 2), TransactionType::Expense, 400.0),
        ];
        let series = monthly_series(&txs);
        assert_eq!(series.points[0].profit, -300.0);
        assert_eq!(series.scale, 400.0);
    }
}
