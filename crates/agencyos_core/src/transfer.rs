//! Document export and import reconciliation.
//!
//! # Invariants
//! - Export is the full document, preferences included, unfiltered.
//! - A payload that is not a JSON object is rejected before anything is
//!   applied; the live document stays unchanged.
//! - A missing or malformed collection inside an otherwise valid payload
//!   imports as empty.
//! - Decoded companies, transactions and logs pass the same validation as
//!   store mutations; failing elements are dropped and counted.
//! - Both policies keep the local UI preferences; incoming `ui` is ignored.
//! - Merge appends incoming entities after existing ones without
//!   de-duplication.

use crate::model::company::Company;
use crate::model::daily_log::DailyLog;
use crate::model::document::Document;
use crate::model::touchpoint::Touchpoint;
use crate::model::transaction::Transaction;
use crate::model::ValidationError;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Suggested file name for exported backups.
pub const EXPORT_FILE_NAME: &str = "agency-os-backup.json";

#[derive(Debug)]
pub enum ImportError {
    /// Payload is not valid JSON.
    Parse(serde_json::Error),
    /// Payload is valid JSON but its root is not an object.
    NotAnObject,
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "import failed: {err}"),
            Self::NotAnObject => write!(f, "import failed: payload root must be an object"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::NotAnObject => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Incoming collections become the document.
    Replace,
    /// Incoming collections are appended to the existing ones.
    Merge,
}

/// Normalized collections decoded from an import payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPayload {
    pub companies: Vec<Company>,
    pub outreach: Vec<Touchpoint>,
    pub transactions: Vec<Transaction>,
    pub logs: Vec<DailyLog>,
    /// Collections present in the payload that failed to decode.
    pub dropped_collections: Vec<&'static str>,
    /// Decoded elements dropped because they failed validation.
    pub rejected_entities: usize,
}

/// Counts of incoming entities applied by one import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub companies: usize,
    pub outreach: usize,
    pub transactions: usize,
    pub logs: usize,
    pub dropped_collections: Vec<&'static str>,
    pub rejected_entities: usize,
}

/// Serializes the document as pretty-printed JSON.
pub fn export_document(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}

/// Parses and normalizes an import payload.
pub fn parse_import(payload: &str) -> Result<ImportPayload, ImportError> {
    let root: Value = serde_json::from_str(payload).map_err(ImportError::Parse)?;
    let Value::Object(root) = root else {
        return Err(ImportError::NotAnObject);
    };

    let mut dropped = Vec::new();
    let mut rejected = 0;
    let companies = keep_valid(
        collection(&root, "companies", &mut dropped),
        "companies",
        Company::validate,
        &mut rejected,
    );
    let outreach = collection(&root, "outreach", &mut dropped);
    let transactions = keep_valid(
        collection(&root, "transactions", &mut dropped),
        "transactions",
        Transaction::validate,
        &mut rejected,
    );
    let logs = keep_valid(
        collection(&root, "logs", &mut dropped),
        "logs",
        DailyLog::validate,
        &mut rejected,
    );

    Ok(ImportPayload {
        companies,
        outreach,
        transactions,
        logs,
        dropped_collections: dropped,
        rejected_entities: rejected,
    })
}

/// Applies a normalized payload to `doc` under `policy`.
pub fn apply_import(
    doc: &mut Document,
    incoming: ImportPayload,
    policy: ImportPolicy,
) -> ImportSummary {
    let summary = ImportSummary {
        companies: incoming.companies.len(),
        outreach: incoming.outreach.len(),
        transactions: incoming.transactions.len(),
        logs: incoming.logs.len(),
        dropped_collections: incoming.dropped_collections,
        rejected_entities: incoming.rejected_entities,
    };

    match policy {
        ImportPolicy::Replace => {
            doc.companies = incoming.companies;
            doc.outreach = incoming.outreach;
            doc.transactions = incoming.transactions;
            doc.logs = incoming.logs;
        }
        ImportPolicy::Merge => {
            doc.companies.extend(incoming.companies);
            doc.outreach.extend(incoming.outreach);
            doc.transactions.extend(incoming.transactions);
            doc.logs.extend(incoming.logs);
        }
    }

    summary
}

fn collection<T: DeserializeOwned>(
    root: &Map<String, Value>,
    name: &'static str,
    dropped: &mut Vec<&'static str>,
) -> Vec<T> {
    let Some(raw) = root.get(name) else {
        return Vec::new();
    };
    match Vec::<T>::deserialize(raw) {
        Ok(items) => items,
        Err(err) => {
            warn!(
                "event=import_normalize module=transfer status=fallback collection={} error={}",
                name, err
            );
            dropped.push(name);
            Vec::new()
        }
    }
}

fn keep_valid<T>(
    items: Vec<T>,
    name: &'static str,
    validate: fn(&T) -> Result<(), ValidationError>,
    rejected: &mut usize,
) -> Vec<T> {
    let before = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| match validate(item) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=import_validate module=transfer status=rejected \
                     collection={} error={}",
                    name, err
                );
                false
            }
        })
        .collect();
    *rejected += before - kept.len();
    kept
}
