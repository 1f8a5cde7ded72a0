use agencyos_core::aggregate::finance::{monthly_series, range_totals, summary_by_company};
use agencyos_core::aggregate::followups::upcoming_follow_ups;
use agencyos_core::aggregate::pipeline::pipeline_totals;
use agencyos_core::aggregate::weekly::weekly_rollup;
use agencyos_core::seed::demo_document_at;
use agencyos_core::{Company, CompanyStatus, RangeBucket, Transaction, TransactionType};
use chrono::{NaiveDate, TimeZone, Utc};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn tx(date: NaiveDate, kind: TransactionType, amount: f64) -> Transaction {
    Transaction::new(date, kind, amount)
}

#[test]
fn demo_document_dashboard_figures() {
    let now = Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap();
    let doc = demo_document_at(now);
    let today = now.date_naive();

    let pipeline = pipeline_totals(&doc.companies, &[]);
    assert_eq!(pipeline[&CompanyStatus::MeetingSet].value, 65_000.0);
    assert_eq!(pipeline[&CompanyStatus::Lead].value, 18_000.0);
    assert_eq!(pipeline[&CompanyStatus::Proposal].count, 1);
    assert!(!pipeline.contains_key(&CompanyStatus::Won));

    let totals = range_totals(&doc.transactions, RangeBucket::ThisMonth, today);
    assert_eq!(totals.income, 18_000.0);
    assert_eq!(totals.expense, 1_200.0);
    assert_eq!(totals.profit, 16_800.0);
    assert_eq!(totals.cashflow, 16_800.0);

    let follow_ups = upcoming_follow_ups(&doc);
    assert_eq!(follow_ups.len(), 2);
    assert_eq!(follow_ups[0].company, "Blackline Ventures");
    assert!(follow_ups[0].next_follow_up_at < follow_ups[1].next_follow_up_at);

    let weekly = weekly_rollup(&doc.logs, today);
    assert_eq!(weekly.calls_made, 12);
    assert_eq!(weekly.emails_sent, 30);
    assert_eq!(weekly.meetings, 2);
}

#[test]
fn pipeline_sums_match_company_totals() {
    let mut companies = Vec::new();
    for (status, value) in [
        (CompanyStatus::Lead, 1_000.0),
        (CompanyStatus::Won, 2_500.0),
        (CompanyStatus::Lead, 500.0),
        (CompanyStatus::Lost, 0.0),
    ] {
        let mut company = Company::new("Co");
        company.status = status;
        company.deal_value = value;
        companies.push(company);
    }

    let totals = pipeline_totals(&companies, &CompanyStatus::ALL);
    assert_eq!(totals.len(), CompanyStatus::ALL.len());
    let value_sum: f64 = totals.values().map(|total| total.value).sum();
    let count_sum: usize = totals.values().map(|total| total.count).sum();
    assert_eq!(value_sum, 4_000.0);
    assert_eq!(count_sum, companies.len());
    assert_eq!(totals[&CompanyStatus::Lead].count, 2);
    assert_eq!(totals[&CompanyStatus::Replied].count, 0);

    let order: Vec<_> = totals.keys().copied().collect();
    assert_eq!(order, CompanyStatus::ALL.to_vec());
}

#[test]
fn range_buckets_respect_month_boundaries() {
    let today = day(2026, 3, 1);
    let txs = vec![
        tx(day(2026, 2, 28), TransactionType::Income, 100.0),
        tx(day(2026, 3, 1), TransactionType::Income, 40.0),
        tx(day(2025, 12, 31), TransactionType::Expense, 30.0),
    ];

    assert_eq!(range_totals(&txs, RangeBucket::ThisMonth, today).income, 40.0);
    assert_eq!(range_totals(&txs, RangeBucket::LastMonth, today).income, 100.0);
    let ytd = range_totals(&txs, RangeBucket::YearToDate, today);
    assert_eq!(ytd.income, 140.0);
    assert_eq!(ytd.expense, 0.0);
    let all = range_totals(&txs, RangeBucket::All, today);
    assert_eq!(all.profit, 110.0);
}

#[test]
fn cashflow_is_the_same_for_every_bucket() {
    let today = day(2026, 7, 20);
    let txs = vec![
        tx(day(2024, 1, 5), TransactionType::Income, 900.0),
        tx(day(2026, 6, 2), TransactionType::Expense, 250.0),
        tx(day(2026, 7, 19), TransactionType::Income, 75.5),
    ];

    let cashflows: Vec<f64> = [
        RangeBucket::ThisMonth,
        RangeBucket::LastMonth,
        RangeBucket::YearToDate,
        RangeBucket::All,
    ]
    .into_iter()
    .map(|bucket| range_totals(&txs, bucket, today).cashflow)
    .collect();

    assert!(cashflows.iter().all(|cashflow| *cashflow == 725.5));
}

#[test]
fn company_summary_groups_unassigned_and_dangling_references() {
    let acme = Company::new("Acme");
    let mut billed = tx(day(2026, 1, 3), TransactionType::Income, 500.0);
    billed.company_id = Some(acme.company_id);
    let mut dangling = tx(day(2026, 1, 4), TransactionType::Expense, 20.0);
    dangling.company_id = Some(uuid::Uuid::new_v4());
    let unassigned = tx(day(2026, 1, 5), TransactionType::Income, 10.0);

    let summary = summary_by_company(&[acme], &[dangling, billed, unassigned]);
    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].company, "Unassigned");
    assert_eq!(summary[0].flow.income, 10.0);
    assert_eq!(summary[0].flow.expense, 20.0);
    assert_eq!(summary[1].company, "Acme");
    assert_eq!(summary[1].flow.net(), 500.0);
}

#[test]
fn monthly_series_keeps_latest_twelve_months() {
    let txs: Vec<Transaction> = (1..=14)
        .map(|offset| {
            let year = 2025 + (offset - 1) / 12;
            let month = ((offset - 1) % 12 + 1) as u32;
            tx(day(year, month, 10), TransactionType::Income, 10.0 * offset as f64)
        })
        .collect();

    let series = monthly_series(&txs);
    assert_eq!(series.points.len(), 12);
    assert_eq!(series.points[0].month, "2025-03");
    assert_eq!(series.points[11].month, "2026-02");
    assert_eq!(series.scale, 140.0);

    assert_eq!(monthly_series(&[]).scale, 1.0);
}
