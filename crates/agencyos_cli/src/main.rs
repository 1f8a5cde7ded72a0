//! Terminal front end for the agencyos state engine.
//!
//! # Responsibility
//! - Resolve data and log locations, then open one `StateStore`.
//! - Render aggregation views as plain text.
//! - Route mutations and import/export through the store, waiting for each
//!   write before exiting.

use agencyos_core::aggregate::finance::{
    monthly_series, range_totals, summary_by_company, summary_by_month,
};
use agencyos_core::aggregate::followups::upcoming_follow_ups;
use agencyos_core::aggregate::pipeline::pipeline_totals;
use agencyos_core::aggregate::views::{filter_companies, kanban};
use agencyos_core::aggregate::weekly::weekly_rollup;
use agencyos_core::config::APP_DIR_NAME;
use agencyos_core::model::document::CompanyFilter;
use agencyos_core::{
    default_log_level, init_logging, Company, CompanyStatus, ImportPolicy, LogSettings,
    Mutation, PersistTicket, RangeBucket, RecurrenceInterval, StateStore, StorageConfig,
    Transaction, TransactionType, EXPORT_FILE_NAME,
};
use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const CHART_WIDTH: f64 = 40.0;

#[derive(Parser, Debug)]
#[command(name = "agencyos")]
#[command(about = "Local-first CRM, outreach and finance tracker")]
#[command(version)]
struct Cli {
    /// Directory holding the stores. Defaults to the platform data directory.
    #[arg(long, global = true, env = "AGENCYOS_DATA_DIR")]
    data_dir: Option<PathBuf>,
    /// Directory for rolling log files. Defaults to `<data-dir>/logs`.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Skip the structured store and use flat files only.
    #[arg(long, global = true)]
    no_structured: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pipeline, finance, follow-up and weekly summary in one view.
    Dashboard {
        #[arg(long, value_parser = parse_range, default_value = "this_month")]
        range: RangeBucket,
    },
    /// Companies grouped by pipeline stage.
    Pipeline {
        /// List member companies under each stage.
        #[arg(long)]
        board: bool,
    },
    /// Scheduled follow-ups, earliest first.
    Followups,
    /// Income, expense and profit totals.
    Finance {
        #[arg(long, value_parser = parse_range, default_value = "this_month")]
        range: RangeBucket,
        #[arg(long, value_enum)]
        by: Option<Grouping>,
    },
    /// Activity totals from the last seven days of logs.
    Weekly,
    /// Monthly income, expense and profit bars.
    Chart,
    /// List companies matching the filters.
    Companies {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_parser = parse_status)]
        status: Option<CompanyStatus>,
        #[arg(long)]
        niche: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    /// Add a company.
    AddCompany {
        name: String,
        #[arg(long, value_parser = parse_status, default_value = "Lead")]
        status: CompanyStatus,
        #[arg(long, default_value_t = 0.0)]
        deal_value: f64,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        niche: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Comma-separated tags.
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Record an income or expense entry.
    AddTransaction {
        #[arg(value_enum)]
        kind: Direction,
        amount: f64,
        /// `YYYY-MM-DD`; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        company: Option<Uuid>,
        #[arg(long, value_enum)]
        recurring: Option<Interval>,
    },
    /// Delete a company by id. Its outreach and transactions are kept.
    DeleteCompany { company_id: Uuid },
    /// Record a quick income entry dated today.
    QuickIncome { amount: f64 },
    /// Log a quick call against the first company.
    QuickTouch,
    /// Replace everything with fresh demo data.
    ResetDemo,
    /// Write the full document as JSON.
    Export {
        /// Output file; defaults to `agency-os-backup.json`.
        path: Option<PathBuf>,
    },
    /// Load a JSON backup, merging by default.
    Import {
        path: PathBuf,
        /// Replace the collections instead of appending.
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Grouping {
    Month,
    Company,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Direction {
    Income,
    Expense,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Interval {
    Monthly,
    Annual,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir.as_deref())?;
    start_logging(&cli, &data_dir);

    let config = StorageConfig::new(data_dir.clone()).with_structured(!cli.no_structured);
    let mut store = StateStore::open(&config)
        .with_context(|| format!("failed to open store in {}", data_dir.display()))?;
    info!(
        "event=cli_start module=cli status=ok kind={} origin={:?}",
        store.backend_kind(),
        store.load_origin()
    );

    run(&mut store, cli.command)
}

fn run(store: &mut StateStore, command: Command) -> anyhow::Result<()> {
    let today = Local::now().date_naive();

    match command {
        Command::Dashboard { range } => print_dashboard(store, range, today),
        Command::Pipeline { board } => print_pipeline(store, board),
        Command::Followups => print_follow_ups(store),
        Command::Finance { range, by } => print_finance(store, range, by, today),
        Command::Weekly => print_weekly(store, today),
        Command::Chart => print_chart(store),
        Command::Companies {
            search,
            status,
            niche,
            city,
        } => {
            let filter = CompanyFilter {
                search,
                status,
                niche,
                city,
            };
            for company in filter_companies(&store.document().companies, &filter) {
                println!(
                    "{}  {:<28} {:<12} {:>12}  {}",
                    company.company_id,
                    company.company_name,
                    company.status.label(),
                    format_money(company.deal_value),
                    company.location
                );
            }
        }
        Command::AddCompany {
            name,
            status,
            deal_value,
            email,
            niche,
            location,
            tags,
        } => {
            let mut company = Company::new(name);
            company.status = status;
            company.deal_value = deal_value;
            company.primary_email = email;
            company.niche = niche;
            company.location = location;
            company.set_tags_from_csv(&tags);
            let company_id = company.company_id;
            settle(store.upsert_company(company)?)?;
            println!("added company {company_id}");
        }
        Command::AddTransaction {
            kind,
            amount,
            date,
            category,
            company,
            recurring,
        } => {
            let kind = match kind {
                Direction::Income => TransactionType::Income,
                Direction::Expense => TransactionType::Expense,
            };
            let mut tx = Transaction::new(date.unwrap_or(today), kind, amount);
            tx.category = category;
            tx.company_id = company;
            tx.recurring = recurring.is_some();
            tx.interval = recurring.map(|interval| match interval {
                Interval::Monthly => RecurrenceInterval::Monthly,
                Interval::Annual => RecurrenceInterval::Annual,
            });
            let tx_id = tx.tx_id;
            settle(store.upsert_transaction(tx)?)?;
            println!("added transaction {tx_id}");
        }
        Command::DeleteCompany { company_id } => {
            let removed = settle(store.delete_company(company_id))?;
            if removed == 0 {
                return Err(anyhow!("company not found: {company_id}"));
            }
            println!("deleted company {company_id}");
        }
        Command::QuickIncome { amount } => {
            let tx_id = settle(store.quick_income(amount, today)?)?;
            println!("added income {} ({tx_id})", format_money(amount));
        }
        Command::QuickTouch => {
            let outreach_id = settle(store.quick_touch(Utc::now())?)?;
            println!("logged touchpoint {outreach_id}");
        }
        Command::ResetDemo => {
            wait(store.reset_demo())?;
            println!("demo data restored");
        }
        Command::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            let payload = store.export_json()?;
            std::fs::write(&path, payload)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("exported to {}", path.display());
        }
        Command::Import { path, replace } => {
            let payload = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let policy = if replace {
                ImportPolicy::Replace
            } else {
                ImportPolicy::Merge
            };
            let summary = settle(store.import_json(&payload, policy)?)?;
            println!(
                "imported {} companies, {} touchpoints, {} transactions, {} logs",
                summary.companies, summary.outreach, summary.transactions, summary.logs
            );
            for name in summary.dropped_collections {
                eprintln!("warning: `{name}` was malformed and imported as empty");
            }
            if summary.rejected_entities > 0 {
                eprintln!("warning: skipped {} invalid entries", summary.rejected_entities);
            }
        }
    }

    Ok(())
}

fn print_dashboard(store: &StateStore, range: RangeBucket, today: NaiveDate) {
    let doc = store.document();
    let totals = range_totals(&doc.transactions, range, today);
    let weekly = weekly_rollup(&doc.logs, today);
    let open_value: f64 = doc
        .companies
        .iter()
        .filter(|company| !matches!(company.status, CompanyStatus::Won | CompanyStatus::Lost))
        .map(|company| company.deal_value)
        .sum();

    println!("== {} ==", range.label());
    println!("income    {:>14}", format_money(totals.income));
    println!("expense   {:>14}", format_money(totals.expense));
    println!("profit    {:>14}", format_money(totals.profit));
    println!("cashflow  {:>14}", format_money(totals.cashflow));
    println!("open pipeline {:>10}", format_money(open_value));
    println!(
        "this week: {} calls, {} emails, {} meetings",
        weekly.calls_made, weekly.emails_sent, weekly.meetings
    );
    println!();
    print_follow_ups(store);
}

fn print_pipeline(store: &StateStore, board: bool) {
    let companies = &store.document().companies;
    let totals = pipeline_totals(companies, &CompanyStatus::ALL);
    for (status, total) in &totals {
        println!(
            "{:<12} {:>3}  {:>14}",
            status.label(),
            total.count,
            format_money(total.value)
        );
    }

    if board {
        for (status, members) in kanban(companies) {
            println!("\n[{status}]");
            for company in members {
                println!("  {}  {}", company.company_name, company.next_action);
            }
        }
    }
}

fn print_follow_ups(store: &StateStore) {
    let follow_ups = upcoming_follow_ups(store.document());
    if follow_ups.is_empty() {
        println!("no follow-ups scheduled");
        return;
    }
    for follow_up in follow_ups {
        println!(
            "{}  {:<28} {}",
            follow_up.next_follow_up_at.format("%Y-%m-%d %H:%M"),
            follow_up.company,
            follow_up.outcome
        );
    }
}

fn print_finance(store: &StateStore, range: RangeBucket, by: Option<Grouping>, today: NaiveDate) {
    let doc = store.document();
    match by {
        None => {
            let totals = range_totals(&doc.transactions, range, today);
            println!("range     {}", range.label());
            println!("income    {:>14}", format_money(totals.income));
            println!("expense   {:>14}", format_money(totals.expense));
            println!("profit    {:>14}", format_money(totals.profit));
            println!("cashflow  {:>14}", format_money(totals.cashflow));
        }
        Some(Grouping::Month) => {
            for (month, flow) in summary_by_month(&doc.transactions) {
                println!(
                    "{month}  {:>14} {:>14} {:>14}",
                    format_money(flow.income),
                    format_money(flow.expense),
                    format_money(flow.net())
                );
            }
        }
        Some(Grouping::Company) => {
            for summary in summary_by_company(&doc.companies, &doc.transactions) {
                println!(
                    "{:<28} {:>14} {:>14} {:>14}",
                    summary.company,
                    format_money(summary.flow.income),
                    format_money(summary.flow.expense),
                    format_money(summary.flow.net())
                );
            }
        }
    }
}

fn print_weekly(store: &StateStore, today: NaiveDate) {
    let weekly = weekly_rollup(&store.document().logs, today);
    println!("days logged  {}", weekly.days_logged);
    println!("calls        {}", weekly.calls_made);
    println!("emails       {}", weekly.emails_sent);
    println!("meetings     {}", weekly.meetings);
    println!("revenue      {}", format_money(weekly.revenue));
    println!("expenses     {}", format_money(weekly.expenses));
}

fn print_chart(store: &StateStore) {
    let series = monthly_series(&store.document().transactions);
    for point in &series.points {
        println!("{}", point.month);
        for (label, value) in [
            ("income", point.income),
            ("expense", point.expense),
            ("profit", point.profit),
        ] {
            println!(
                "  {label:<8}{:<40} {}",
                bar(value, series.scale),
                format_money(value)
            );
        }
    }
}

fn bar(value: f64, scale: f64) -> String {
    let width = (value.abs() / scale * CHART_WIDTH).round() as usize;
    let glyph = if value < 0.0 { '-' } else { '#' };
    std::iter::repeat(glyph).take(width).collect()
}

/// Waits for the write behind `mutation` and returns its outcome.
fn settle<T>(mutation: Mutation<T>) -> anyhow::Result<T> {
    wait(mutation.persisted)?;
    Ok(mutation.outcome)
}

fn wait(ticket: PersistTicket) -> anyhow::Result<()> {
    ticket.wait().context("change applied but not saved")
}

fn resolve_data_dir(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_dir()
            .ok_or_else(|| anyhow!("no platform data directory; pass --data-dir"))?
            .join(APP_DIR_NAME),
    };
    if dir.is_absolute() {
        Ok(dir)
    } else {
        Ok(std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(dir))
    }
}

fn start_logging(cli: &Cli, data_dir: &Path) {
    let log_dir = match &cli.log_dir {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => data_dir.join(dir),
        None => data_dir.join("logs"),
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());

    let started = LogSettings::new(level, &log_dir)
        .map(|settings| settings.with_echo_warnings(true))
        .and_then(init_logging);
    if let Err(err) = started {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn parse_range(value: &str) -> Result<RangeBucket, String> {
    RangeBucket::parse(value)
        .ok_or_else(|| format!("unknown range `{value}`; expected this_month|last_month|ytd|all"))
}

fn parse_status(value: &str) -> Result<CompanyStatus, String> {
    CompanyStatus::parse(value).ok_or_else(|| {
        let known: Vec<&str> = CompanyStatus::ALL.iter().map(|status| status.label()).collect();
        format!("unknown status `{value}`; expected one of {}", known.join(", "))
    })
}

/// Whole-dollar amount with thousands separators, e.g. `$18,000`.
fn format_money(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::{bar, format_money, Cli, Command, Direction, Grouping};
    use agencyos_core::{CompanyStatus, RangeBucket};
    use clap::error::ErrorKind;
    use clap::Parser;

    #[test]
    fn cli_requires_subcommand() {
        let err = match Cli::try_parse_from(["agencyos"]) {
            Ok(_) => panic!("expected missing subcommand parse error"),
            Err(err) => err,
        };
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }

    #[test]
    fn finance_accepts_range_aliases_and_grouping() {
        let cli = Cli::try_parse_from(["agencyos", "finance", "--range", "ytd", "--by", "company"])
            .unwrap();
        match cli.command {
            Command::Finance { range, by } => {
                assert_eq!(range, RangeBucket::YearToDate);
                assert_eq!(by, Some(Grouping::Company));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let err = Cli::try_parse_from(["agencyos", "finance", "--range", "quarter"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "agencyos",
            "add-company",
            "Acme",
            "--status",
            "Meeting Set",
            "--data-dir",
            "/tmp/agencyos",
            "--no-structured",
        ])
        .unwrap();
        assert!(cli.no_structured);
        assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/agencyos")));
        match cli.command {
            Command::AddCompany { name, status, .. } => {
                assert_eq!(name, "Acme");
                assert_eq!(status, CompanyStatus::MeetingSet);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_transaction_parses_direction_and_date() {
        let cli = Cli::try_parse_from([
            "agencyos",
            "add-transaction",
            "expense",
            "120.5",
            "--date",
            "2026-04-30",
            "--recurring",
            "monthly",
        ])
        .unwrap();
        match cli.command {
            Command::AddTransaction {
                kind, amount, date, ..
            } => {
                assert_eq!(kind, Direction::Expense);
                assert_eq!(amount, 120.5);
                assert_eq!(date.map(|d| d.to_string()).as_deref(), Some("2026-04-30"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn money_is_grouped_by_thousands() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(999.4), "$999");
        assert_eq!(format_money(18_000.0), "$18,000");
        assert_eq!(format_money(1_234_567.0), "$1,234,567");
        assert_eq!(format_money(-1_200.0), "-$1,200");
    }

    #[test]
    fn bars_scale_to_chart_width() {
        assert_eq!(bar(100.0, 100.0).len(), 40);
        assert_eq!(bar(0.0, 1.0), "");
        assert!(bar(-50.0, 100.0).starts_with('-'));
    }
}
