//! Financial transaction record.
//!
//! # Invariants
//! - `amount > 0` always; `kind` carries the direction.
//! - `interval` is required when `recurring` is set.

use super::company::CompanyId;
use super::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TransactionId = Uuid;

/// Money direction. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecurrenceInterval {
    Monthly,
    Annual,
}

/// One income or expense entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub tx_id: TransactionId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    /// Soft reference; `None` means unassigned.
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub interval: Option<RecurrenceInterval>,
}

impl Transaction {
    /// Creates a one-off transaction with a fresh id.
    pub fn new(date: NaiveDate, kind: TransactionType, amount: f64) -> Self {
        Self {
            tx_id: Uuid::new_v4(),
            date,
            kind,
            amount,
            category: String::new(),
            company_id: None,
            description: String::new(),
            payment_method: String::new(),
            recurring: false,
            interval: None,
        }
    }

    /// Signed contribution to cashflow: income adds, expense subtracts.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        if self.recurring && self.interval.is_none() {
            return Err(ValidationError::MissingInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RecurrenceInterval, Transaction, TransactionType};
    use crate::model::ValidationError;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn validate_requires_strictly_positive_amount() {
        assert!(Transaction::new(day(), TransactionType::Income, 0.01)
            .validate()
            .is_ok());

        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = Transaction::new(day(), TransactionType::Expense, amount)
                .validate()
                .unwrap_err();
            assert!(matches!(err, ValidationError::NonPositiveAmount(_)));
        }
    }

    #[test]
    fn recurring_requires_interval() {
        let mut tx = Transaction::new(day(), TransactionType::Expense, 1200.0);
        tx.recurring = true;
        assert_eq!(tx.validate(), Err(ValidationError::MissingInterval));

        tx.interval = Some(RecurrenceInterval::Monthly);
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn wire_shape_keeps_type_and_plain_date() {
        let tx = Transaction::new(day(), TransactionType::Expense, 1200.0);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "Expense");
        assert_eq!(json["date"], "2026-03-01");
        assert!(json["companyId"].is_null());
        assert_eq!(tx.signed_amount(), -1200.0);
    }
}
