//! Upcoming follow-up ordering.

use super::{resolve_company_name, UNKNOWN_COMPANY};
use crate::model::document::Document;
use crate::model::touchpoint::{Outcome, TouchpointId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct FollowUp {
    pub outreach_id: TouchpointId,
    /// Resolved company name, `"Unknown"` when the reference dangles.
    pub company: String,
    pub next_follow_up_at: DateTime<Utc>,
    pub outcome: Outcome,
}

/// Touchpoints with a scheduled follow-up, earliest first.
///
/// The sort is stable: equal timestamps keep collection order.
pub fn upcoming_follow_ups(doc: &Document) -> Vec<FollowUp> {
    let mut follow_ups: Vec<FollowUp> = doc
        .outreach
        .iter()
        .filter_map(|touch| {
            touch.next_follow_up_at.map(|next| FollowUp {
                outreach_id: touch.outreach_id,
                company: resolve_company_name(
                    &doc.companies,
                    Some(touch.company_id),
                    UNKNOWN_COMPANY,
                )
                .to_string(),
                next_follow_up_at: next,
                outcome: touch.outcome,
            })
        })
        .collect();

    follow_ups.sort_by_key(|follow_up| follow_up.next_follow_up_at);
    follow_ups
}
