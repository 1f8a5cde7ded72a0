use agencyos_core::aggregate::finance::range_totals;
use agencyos_core::{
    ImportError, ImportPolicy, RangeBucket, StateStore, StorageConfig, StoreError, UiPreferences,
};
use chrono::NaiveDate;

fn fallback_store(dir: &tempfile::TempDir) -> StateStore {
    StateStore::open(&StorageConfig::new(dir.path()).with_structured(false)).unwrap()
}

#[test]
fn replace_import_of_an_export_reproduces_the_collections() {
    let source_dir = tempfile::tempdir().unwrap();
    let source = fallback_store(&source_dir);
    let payload = source.export_json().unwrap();

    let target_dir = tempfile::tempdir().unwrap();
    let mut target = fallback_store(&target_dir);
    let summary = target
        .import_json(&payload, ImportPolicy::Replace)
        .unwrap()
        .outcome;

    assert_eq!(summary.companies, 3);
    assert!(summary.dropped_collections.is_empty());
    assert_eq!(target.document().companies, source.document().companies);
    assert_eq!(target.document().outreach, source.document().outreach);
    assert_eq!(target.document().transactions, source.document().transactions);
    assert_eq!(target.document().logs, source.document().logs);
}

#[test]
fn merging_an_export_into_itself_doubles_every_collection() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = fallback_store(&dir);
    store.set_ui_preferences(UiPreferences {
        range: RangeBucket::YearToDate,
        log_search: "momentum".to_string(),
        ..UiPreferences::default()
    });
    let before = store.document().clone();
    let payload = store.export_json().unwrap();

    store.import_json(&payload, ImportPolicy::Merge).unwrap();

    let doc = store.document();
    assert_eq!(doc.companies.len(), 2 * before.companies.len());
    assert_eq!(doc.outreach.len(), 2 * before.outreach.len());
    assert_eq!(doc.transactions.len(), 2 * before.transactions.len());
    assert_eq!(doc.logs.len(), 2 * before.logs.len());
    assert_eq!(doc.companies[..before.companies.len()], before.companies[..]);
    assert_eq!(doc.ui, before.ui);
}

#[test]
fn malformed_payload_leaves_document_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = fallback_store(&dir);
    let before = store.document().clone();

    assert!(matches!(
        store.import_json("{\"companies\": [", ImportPolicy::Replace),
        Err(StoreError::Import(ImportError::Parse(_)))
    ));
    assert!(matches!(
        store.import_json("42", ImportPolicy::Merge),
        Err(StoreError::Import(ImportError::NotAnObject))
    ));
    assert_eq!(store.document(), &before);
}

#[test]
fn replace_with_partial_payload_empties_missing_collections() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = fallback_store(&dir);

    let summary = store
        .import_json(
            r#"{"companies": [], "outreach": {"unexpected": true}}"#,
            ImportPolicy::Replace,
        )
        .unwrap()
        .outcome;

    assert_eq!(summary.dropped_collections, vec!["outreach"]);
    assert_eq!(store.document().entity_count(), 0);
}

#[test]
fn import_rejects_entities_that_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = fallback_store(&dir);

    let payload = r#"{
        "companies": [
            {"companyId": "1d0f7a52-5b8e-4c1a-9f3e-6a2b8c4d0e11", "companyName": "Negative Deal",
             "status": "Proposal", "dealValue": -99, "createdAt": 1, "updatedAt": 1},
            {"companyId": "2e1a8b63-6c9f-4d2b-8a4f-7b3c9d5e1f22", "companyName": "Bad Email",
             "status": "Lead", "primaryEmail": "nobody", "createdAt": 1, "updatedAt": 1}
        ],
        "transactions": [
            {"txId": "3f2b9c74-7d0a-4e3c-9b5a-8c4d0e6f2a33", "date": "2026-02-01",
             "type": "Income", "amount": 1200},
            {"txId": "4a3c0d85-8e1b-4f4d-8c6b-9d5e1f7a3b44", "date": "2026-02-02",
             "type": "Income", "amount": -500}
        ],
        "logs": [
            {"logId": "5b4d1e96-9f2c-4a5e-9d7c-0e6f2a8b4c55", "date": "2026-02-03",
             "metrics": {"revenueToday": -10}}
        ]
    }"#;

    let summary = store
        .import_json(payload, ImportPolicy::Replace)
        .unwrap()
        .outcome;

    assert_eq!(summary.rejected_entities, 4);
    assert_eq!(summary.companies, 0);
    assert_eq!(summary.transactions, 1);
    assert_eq!(summary.logs, 0);
    assert!(summary.dropped_collections.is_empty());

    let doc = store.document();
    assert!(doc.companies.is_empty());
    assert!(doc.logs.is_empty());
    assert!(doc.transactions.iter().all(|tx| tx.amount > 0.0));

    let today = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
    let totals = range_totals(&doc.transactions, RangeBucket::All, today);
    assert_eq!(totals.income, 1200.0);
    assert_eq!(totals.cashflow, 1200.0);
}

#[test]
fn export_carries_preferences_and_wire_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = fallback_store(&dir);
    store.set_ui_preferences(UiPreferences {
        range: RangeBucket::LastMonth,
        ..UiPreferences::default()
    });

    let exported: serde_json::Value = serde_json::from_str(&store.export_json().unwrap()).unwrap();
    assert!(exported["companies"][0]["companyId"].is_string());
    assert!(exported["transactions"][0]["txId"].is_string());
    assert_eq!(exported["transactions"][0]["type"], "Income");
    assert_eq!(exported["ui"]["range"], "last_month");
}
