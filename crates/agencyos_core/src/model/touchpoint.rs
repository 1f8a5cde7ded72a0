//! Outreach touchpoint record.

use super::company::CompanyId;
use super::utc_instant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TouchpointId = Uuid;

/// Result of one outreach attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "No reply")]
    NoReply,
    Reply,
    Bounce,
    Meeting,
    #[serde(rename = "Not interested")]
    NotInterested,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Self::NoReply,
        Self::Reply,
        Self::Bounce,
        Self::Meeting,
        Self::NotInterested,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NoReply => "No reply",
            Self::Reply => "Reply",
            Self::Bounce => "Bounce",
            Self::Meeting => "Meeting",
            Self::NotInterested => "Not interested",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|outcome| outcome.label().eq_ignore_ascii_case(normalized))
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One logged outreach attempt against a company.
///
/// `company_id` must name a live company when the touchpoint is first
/// inserted; afterwards it may dangle if that company is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Touchpoint {
    pub outreach_id: TouchpointId,
    pub company_id: CompanyId,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub template_name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(with = "utc_instant")]
    pub sent_at: DateTime<Utc>,
    pub outcome: Outcome,
    #[serde(default, with = "utc_instant::option")]
    pub next_follow_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub follow_up_count: u32,
    #[serde(default)]
    pub notes: String,
}

impl Touchpoint {
    /// Creates a touchpoint with a fresh id and a single follow-up counted.
    pub fn new(company_id: CompanyId, channel: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            outreach_id: Uuid::new_v4(),
            company_id,
            channel: channel.into(),
            template_name: String::new(),
            subject: String::new(),
            sent_at,
            outcome: Outcome::NoReply,
            next_follow_up_at: None,
            follow_up_count: 1,
            notes: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Outcome, Touchpoint};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn wire_shape_uses_camel_case_and_labels() {
        let sent_at = Utc.with_ymd_and_hms(2026, 2, 13, 10, 0, 0).unwrap();
        let mut touch = Touchpoint::new(Uuid::new_v4(), "Email", sent_at);
        touch.outcome = Outcome::NotInterested;

        let json = serde_json::to_value(&touch).unwrap();
        assert_eq!(json["outcome"], "Not interested");
        assert_eq!(json["sentAt"], "2026-02-13T10:00:00+00:00");
        assert!(json["nextFollowUpAt"].is_null());
        assert_eq!(json["followUpCount"], 1);
    }

    #[test]
    fn blank_follow_up_reads_as_none() {
        let json = serde_json::json!({
            "outreachId": Uuid::new_v4(),
            "companyId": Uuid::new_v4(),
            "channel": "Email",
            "subject": "Intro",
            "sentAt": "2026-02-13T10:00",
            "outcome": "Reply",
            "nextFollowUpAt": "",
            "followUpCount": 2
        });
        let touch: Touchpoint = serde_json::from_value(json).unwrap();
        assert_eq!(touch.next_follow_up_at, None);
        assert_eq!(touch.outcome, Outcome::Reply);
    }
}
