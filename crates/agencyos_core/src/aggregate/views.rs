//! List filters and per-screen projections.

use super::finance::month_key;
use crate::model::company::{Company, CompanyId, CompanyStatus};
use crate::model::daily_log::DailyLog;
use crate::model::document::{CompanyFilter, Document, TransactionFilter};
use crate::model::touchpoint::Touchpoint;
use crate::model::transaction::Transaction;
use chrono::NaiveDate;

/// Companies matching every non-empty field of `filter`, in collection order.
pub fn filter_companies<'a>(companies: &'a [Company], filter: &CompanyFilter) -> Vec<&'a Company> {
    let search = filter.search.trim().to_lowercase();
    companies
        .iter()
        .filter(|company| {
            search.is_empty()
                || company.company_name.to_lowercase().contains(&search)
                || company.notes.to_lowercase().contains(&search)
        })
        .filter(|company| filter.status.map_or(true, |status| company.status == status))
        .filter(|company| {
            non_empty(&filter.niche).map_or(true, |niche| company.niche == niche)
        })
        .filter(|company| {
            non_empty(&filter.city).map_or(true, |city| company.location.contains(city))
        })
        .collect()
}

/// Transactions matching every non-empty field of `filter`, in collection order.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &TransactionFilter,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|tx| non_empty(&filter.month).map_or(true, |month| month_key(tx.date) == month))
        .filter(|tx| filter.kind.map_or(true, |kind| tx.kind == kind))
        .filter(|tx| non_empty(&filter.category).map_or(true, |category| tx.category == category))
        .filter(|tx| {
            filter
                .company_id
                .map_or(true, |company_id| tx.company_id == Some(company_id))
        })
        .collect()
}

/// Logs whose serialized form contains `term`, ignoring case.
pub fn search_logs<'a>(logs: &'a [DailyLog], term: &str) -> Vec<&'a DailyLog> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return logs.iter().collect();
    }
    logs.iter()
        .filter(|log| {
            serde_json::to_string(log)
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}

/// Every status in pipeline order with its member companies.
pub fn kanban(companies: &[Company]) -> Vec<(CompanyStatus, Vec<&Company>)> {
    CompanyStatus::ALL
        .into_iter()
        .map(|status| {
            let members = companies
                .iter()
                .filter(|company| company.status == status)
                .collect();
            (status, members)
        })
        .collect()
}

/// Touchpoints for one company, most recently sent first.
pub fn company_outreach(doc: &Document, company_id: CompanyId) -> Vec<&Touchpoint> {
    let mut history: Vec<&Touchpoint> = doc
        .outreach
        .iter()
        .filter(|touch| touch.company_id == company_id)
        .collect();
    history.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    history
}

/// The log addressed by `today`, if one was saved.
pub fn today_log(logs: &[DailyLog], today: NaiveDate) -> Option<&DailyLog> {
    logs.iter().find(|log| log.date == today)
}

/// Distinct niches in order of first appearance.
pub fn distinct_niches(companies: &[Company]) -> Vec<&str> {
    distinct(companies.iter().map(|company| company.niche.as_str()))
}

/// Distinct locations in order of first appearance.
pub fn distinct_locations(companies: &[Company]) -> Vec<&str> {
    distinct(companies.iter().map(|company| company.location.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}
