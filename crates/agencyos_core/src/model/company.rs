//! Company (lead) record.
//!
//! # Invariants
//! - `company_id` is generated once and never reassigned.
//! - `primary_email`, when present and non-empty, matches `local@domain.tld`.
//! - `deal_value` is finite and non-negative.
//! - `updated_at >= created_at`.

use super::{now_epoch_ms, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub type CompanyId = Uuid;

/// Sales pipeline stage. Declaration order is the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompanyStatus {
    Lead,
    Contacted,
    Replied,
    #[serde(rename = "Meeting Set")]
    MeetingSet,
    Proposal,
    Won,
    Lost,
}

impl CompanyStatus {
    /// Every status in pipeline order.
    pub const ALL: [CompanyStatus; 7] = [
        Self::Lead,
        Self::Contacted,
        Self::Replied,
        Self::MeetingSet,
        Self::Proposal,
        Self::Won,
        Self::Lost,
    ];

    /// Display label, identical to the wire value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Contacted => "Contacted",
            Self::Replied => "Replied",
            Self::MeetingSet => "Meeting Set",
            Self::Proposal => "Proposal",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }

    /// Parses a display label, ignoring ASCII case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(normalized))
    }
}

impl Display for CompanyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A tracked company / lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub company_id: CompanyId,
    pub company_name: String,
    #[serde(default)]
    pub niche: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub primary_email: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub owner_name: String,
    pub status: CompanyStatus,
    #[serde(default)]
    pub deal_value: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub next_action: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
}

impl Company {
    /// Creates a company with a fresh id, `Lead` status and current timestamps.
    pub fn new(company_name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), company_name, now_epoch_ms())
    }

    /// Creates a company with a caller-provided id and creation time.
    pub fn with_id(
        company_id: CompanyId,
        company_name: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            company_id,
            company_name: company_name.into(),
            niche: String::new(),
            location: String::new(),
            website: String::new(),
            primary_email: None,
            phone: String::new(),
            owner_name: String::new(),
            status: CompanyStatus::Lead,
            deal_value: 0.0,
            notes: String::new(),
            tags: BTreeSet::new(),
            next_action: String::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Replaces the tag set from comma-separated input, dropping blanks.
    pub fn set_tags_from_csv(&mut self, raw: &str) {
        self.tags = raw
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();
    }

    /// Validates user-entered fields before the record enters the document.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(email) = self.primary_email.as_deref() {
            let trimmed = email.trim();
            if !trimmed.is_empty() && !EMAIL_SHAPE_RE.is_match(trimmed) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }

        if !self.deal_value.is_finite() || self.deal_value < 0.0 {
            return Err(ValidationError::InvalidDealValue(self.deal_value));
        }

        if self.updated_at < self.created_at {
            return Err(ValidationError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }

        Ok(())
    }
}
