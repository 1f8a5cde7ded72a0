//! Root application document and persisted display preferences.
//!
//! # Invariants
//! - The four entity collections share one lifecycle; there is no
//!   per-entity expiry.
//! - `ui` is display continuity state only. It is never validated, and a
//!   malformed persisted value decodes to defaults instead of failing the
//!   whole document.

use super::company::{Company, CompanyId, CompanyStatus};
use super::daily_log::DailyLog;
use super::touchpoint::Touchpoint;
use super::transaction::{Transaction, TransactionType};
use serde::{Deserialize, Deserializer, Serialize};

/// The single root state object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub outreach: Vec<Touchpoint>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub logs: Vec<DailyLog>,
    #[serde(default, deserialize_with = "lenient_ui")]
    pub ui: UiPreferences,
}

impl Document {
    /// Creates an empty document with default preferences.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Finds a company by id. Dangling ids yield `None`.
    pub fn company(&self, company_id: CompanyId) -> Option<&Company> {
        self.companies
            .iter()
            .find(|company| company.company_id == company_id)
    }

    /// Total entity count across the four collections.
    pub fn entity_count(&self) -> usize {
        self.companies.len() + self.outreach.len() + self.transactions.len() + self.logs.len()
    }
}

/// Named transaction date filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBucket {
    #[default]
    ThisMonth,
    LastMonth,
    YearToDate,
    All,
}

impl RangeBucket {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "this_month" | "month" => Some(Self::ThisMonth),
            "last_month" => Some(Self::LastMonth),
            "year_to_date" | "ytd" => Some(Self::YearToDate),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ThisMonth => "this month",
            Self::LastMonth => "last month",
            Self::YearToDate => "year to date",
            Self::All => "all time",
        }
    }
}

/// Company list filter. Empty fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyFilter {
    /// Case-insensitive substring over name and notes.
    pub search: String,
    pub status: Option<CompanyStatus>,
    /// Exact niche match.
    pub niche: Option<String>,
    /// Substring match against location.
    pub city: Option<String>,
}

/// Transaction list filter. Empty fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionFilter {
    /// `YYYY-MM` prefix of the transaction date.
    pub month: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub company_id: Option<CompanyId>,
}

/// Display state persisted for continuity between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub range: RangeBucket,
    pub company_filter: CompanyFilter,
    pub transaction_filter: TransactionFilter,
    pub log_search: String,
}

fn lenient_ui<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UiPreferences, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}
