//! Starter document used on first run and on explicit reset.
//!
//! Content is fixed; ids and timestamps are generated per call.

use crate::model::company::{Company, CompanyStatus};
use crate::model::daily_log::{DailyLog, LogMetrics};
use crate::model::document::Document;
use crate::model::touchpoint::{Outcome, Touchpoint};
use crate::model::transaction::{RecurrenceInterval, Transaction, TransactionType};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Builds the demo document stamped with the current time.
pub fn demo_document() -> Document {
    demo_document_at(Utc::now())
}

/// Builds the demo document as of `now`.
pub fn demo_document_at(now: DateTime<Utc>) -> Document {
    let created_at = now.timestamp_millis();
    let today = now.date_naive();

    let blackline = demo_company(
        created_at,
        CompanyFields {
            name: "Blackline Ventures",
            niche: "SaaS",
            location: "NY, NY",
            website: "https://blackline.example",
            email: "ceo@blackline.co",
            phone: "212-555-0101",
            owner: "Evelyn Stone",
            status: CompanyStatus::MeetingSet,
            deal_value: 65_000.0,
            notes: "Warm intro via board.",
            tags: &["enterprise", "priority"],
            next_action: "Send proposal",
        },
    );
    let northstar = demo_company(
        created_at,
        CompanyFields {
            name: "Northstar Media",
            niche: "Media",
            location: "SF, CA",
            website: "https://northstar.example",
            email: "ops@northstar.media",
            phone: "415-555-2333",
            owner: "Kai Turner",
            status: CompanyStatus::Lead,
            deal_value: 18_000.0,
            notes: "Cold outbound list",
            tags: &["media"],
            next_action: "Call CFO",
        },
    );
    let harbor = demo_company(
        created_at,
        CompanyFields {
            name: "Harbor Logistics",
            niche: "Logistics",
            location: "Austin, TX",
            website: "",
            email: "hello@harborlog.com",
            phone: "512-555-1000",
            owner: "Mara Quinn",
            status: CompanyStatus::Proposal,
            deal_value: 42_000.0,
            notes: "RFP stage",
            tags: &["logistics", "rfp"],
            next_action: "Follow-up on RFP",
        },
    );

    let outreach = vec![
        Touchpoint {
            outreach_id: Uuid::new_v4(),
            company_id: blackline.company_id,
            channel: "Email".to_string(),
            template_name: "Warm Intro".to_string(),
            subject: "Intro deck".to_string(),
            sent_at: now,
            outcome: Outcome::Meeting,
            next_follow_up_at: Some(now + Duration::days(1)),
            follow_up_count: 2,
            notes: "Meeting booked".to_string(),
        },
        Touchpoint {
            outreach_id: Uuid::new_v4(),
            company_id: northstar.company_id,
            channel: "LinkedIn".to_string(),
            template_name: "Cold".to_string(),
            subject: "Ops revamp".to_string(),
            sent_at: now,
            outcome: Outcome::NoReply,
            next_follow_up_at: Some(now + Duration::days(2)),
            follow_up_count: 1,
            notes: "Left note".to_string(),
        },
    ];

    let mut phase_one = Transaction::new(today, TransactionType::Income, 18_000.0);
    phase_one.category = "Revenue-Client".to_string();
    phase_one.company_id = Some(blackline.company_id);
    phase_one.description = "Phase 1 payment".to_string();
    phase_one.payment_method = "Wire".to_string();

    let mut tools = Transaction::new(today, TransactionType::Expense, 1_200.0);
    tools.category = "Software".to_string();
    tools.description = "Tools".to_string();
    tools.payment_method = "Card".to_string();
    tools.recurring = true;
    tools.interval = Some(RecurrenceInterval::Monthly);

    let mut log = DailyLog::new(today);
    log.top_priorities = vec!["Close Blackline".to_string(), "Refine outreach".to_string()];
    log.wins = vec!["Booked meeting".to_string()];
    log.blockers = vec!["Waiting on data".to_string()];
    log.metrics = LogMetrics {
        calls_made: 12,
        emails_sent: 30,
        meetings: 2,
        revenue_today: 18_000.0,
        expenses_today: 1_200.0,
    };
    log.notes = "Good momentum".to_string();

    Document {
        companies: vec![blackline, northstar, harbor],
        outreach,
        transactions: vec![phase_one, tools],
        logs: vec![log],
        ui: Default::default(),
    }
}

struct CompanyFields {
    name: &'static str,
    niche: &'static str,
    location: &'static str,
    website: &'static str,
    email: &'static str,
    phone: &'static str,
    owner: &'static str,
    status: CompanyStatus,
    deal_value: f64,
    notes: &'static str,
    tags: &'static [&'static str],
    next_action: &'static str,
}

fn demo_company(created_at: i64, fields: CompanyFields) -> Company {
    let mut company = Company::with_id(Uuid::new_v4(), fields.name, created_at);
    company.niche = fields.niche.to_string();
    company.location = fields.location.to_string();
    company.website = fields.website.to_string();
    company.primary_email = Some(fields.email.to_string());
    company.phone = fields.phone.to_string();
    company.owner_name = fields.owner.to_string();
    company.status = fields.status;
    company.deal_value = fields.deal_value;
    company.notes = fields.notes.to_string();
    company.tags = fields.tags.iter().map(|tag| tag.to_string()).collect();
    company.next_action = fields.next_action.to_string();
    company
}
