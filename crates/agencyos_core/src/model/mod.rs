//! Domain model for the operations tracker document.
//!
//! # Responsibility
//! - Define the entity records stored in the single application document.
//! - Provide mutation-boundary validation for user-entered records.
//!
//! # Invariants
//! - Every entity is identified by a generated `Uuid` that never changes.
//! - Money amounts on transactions are strictly positive; direction is
//!   carried by `TransactionType`, never by sign.
//! - Foreign references (`company_id`) are soft: they may dangle after a
//!   company is deleted and are resolved lazily at read time.
//!
//! # See also
//! - `crate::aggregate` for the read-side resolution of soft references.

pub mod company;
pub mod daily_log;
pub mod document;
pub mod touchpoint;
pub mod transaction;

use chrono::{NaiveDate, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Mutation-boundary validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Email present but not shaped like `local@domain.tld`.
    InvalidEmail(String),
    /// Deal value is negative, NaN or infinite.
    InvalidDealValue(f64),
    /// `updated_at` is earlier than `created_at`.
    TimestampOrder { created_at: i64, updated_at: i64 },
    /// Transaction amount is zero, negative, NaN or infinite.
    NonPositiveAmount(f64),
    /// Recurring transaction without a recurrence interval.
    MissingInterval,
    /// A daily log money metric is negative or non-finite.
    InvalidMetric { field: &'static str, value: f64 },
    /// Calendar date text cannot be parsed as `YYYY-MM-DD`.
    InvalidDate(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidDealValue(value) => {
                write!(f, "deal value must be a non-negative number, got {value}")
            }
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
            Self::NonPositiveAmount(value) => {
                write!(f, "amount must be positive, got {value}")
            }
            Self::MissingInterval => write!(f, "recurring transactions require an interval"),
            Self::InvalidMetric { field, value } => {
                write!(f, "metric `{field}` must be a non-negative number, got {value}")
            }
            Self::InvalidDate(value) => write!(f, "invalid date: `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Parses user-entered `YYYY-MM-DD` text into a calendar date.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Serde adapter for UTC instants.
///
/// Writes RFC 3339. Reads RFC 3339, and also the zone-less
/// `YYYY-MM-DDTHH:MM[:SS]` shape produced by date-time form inputs, which is
/// interpreted as UTC.
pub(crate) mod utc_instant {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const ZONELESS_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
            return Some(parsed.with_timezone(&Utc));
        }
        ZONELESS_FORMATS.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|naive| naive.and_utc())
        })
    }

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{text}`")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(instant) => serializer.serialize_some(&instant.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            // Empty strings come from cleared form inputs.
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(text) if text.trim().is_empty() => Ok(None),
                Some(text) => super::parse(&text).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp `{text}`"))
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_calendar_date, utc_instant, ValidationError};
    use chrono::{Datelike, Timelike};

    #[test]
    fn parse_calendar_date_accepts_iso_dates_and_rejects_garbage() {
        let date = parse_calendar_date(" 2026-03-01 ").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2026, 3, 1));

        let err = parse_calendar_date("03/01/2026").unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("03/01/2026".to_string()));
    }

    #[test]
    fn utc_instant_reads_zoneless_form_values_as_utc() {
        let parsed = utc_instant::parse("2026-02-13T09:30").unwrap();
        assert_eq!((parsed.hour(), parsed.minute()), (9, 30));

        let offset = utc_instant::parse("2026-02-13T09:30:00+02:00").unwrap();
        assert_eq!(offset.hour(), 7);

        assert!(utc_instant::parse("yesterday").is_none());
    }
}
