//! Authoritative holder of the live document.
//!
//! # Responsibility
//! - Load the document once at startup, seeding demo data when nothing
//!   usable is stored.
//! - Apply typed per-entity mutations and persist after each one.
//! - Route import/export through the transfer engine.
//!
//! # Invariants
//! - The store is the only writer of the document; callers receive `&Document`.
//! - A rejected mutation leaves the document unchanged and persists nothing.
//! - Upsert replaces the first element with an equal key in place and
//!   otherwise appends; delete removes every element with that key.
//! - At most one daily log exists per calendar date when logs are written
//!   through `upsert_log_by_date`.

mod persist;

pub use persist::{PersistError, PersistTicket};

use crate::backend::{select_backend, BackendKind, StorageBackend};
use crate::config::StorageConfig;
use crate::model::company::{Company, CompanyId};
use crate::model::daily_log::{DailyLog, DailyLogId};
use crate::model::document::{Document, UiPreferences};
use crate::model::now_epoch_ms;
use crate::model::touchpoint::{Outcome, Touchpoint, TouchpointId};
use crate::model::transaction::{Transaction, TransactionId, TransactionType};
use crate::model::ValidationError;
use crate::seed::demo_document;
use crate::transfer::{self, ImportError, ImportPolicy, ImportSummary};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{error, info, warn};
use persist::Persister;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    /// A new touchpoint names a company that does not exist.
    UnknownCompany(CompanyId),
    /// Operation needs at least one company.
    NoCompanies,
    Serialize(serde_json::Error),
    Import(ImportError),
    /// The persistence writer thread could not be started.
    WorkerSpawn(std::io::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::UnknownCompany(id) => write!(f, "company not found: {id}"),
            Self::NoCompanies => write!(f, "add a company first"),
            Self::Serialize(err) => write!(f, "failed to serialize document: {err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::WorkerSpawn(err) => write!(f, "failed to start persistence writer: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::WorkerSpawn(err) => Some(err),
            Self::UnknownCompany(_) | Self::NoCompanies => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ImportError> for StoreError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

/// How a document came to be live at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Decoded from the stored blob.
    Restored,
    /// Nothing was stored; demo data was seeded.
    SeededEmpty,
    /// A blob existed but could not be read or decoded; demo data replaced it.
    SeededCorrupt,
}

/// Whether an upsert appended or replaced in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced { index: usize },
}

/// Result of a mutation: what happened plus the persist completion handle.
#[derive(Debug)]
pub struct Mutation<T> {
    pub outcome: T,
    pub persisted: PersistTicket,
}

pub struct StateStore {
    doc: Document,
    origin: LoadOrigin,
    persister: Persister,
}

impl StateStore {
    /// Selects the backend for `config` and loads the document.
    pub fn open(config: &StorageConfig) -> StoreResult<Self> {
        Self::with_backend(select_backend(config))
    }

    /// Loads the document through an already-resolved backend.
    ///
    /// Absent, unreadable or undecodable state is replaced by demo data,
    /// which is persisted immediately. That replacement is logged, not
    /// returned as an error.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> StoreResult<Self> {
        let kind = backend.kind();
        let (doc, origin) = load_document(backend.as_ref());
        let persister = Persister::new(backend).map_err(StoreError::WorkerSpawn)?;

        let mut store = Self {
            doc,
            origin,
            persister,
        };
        if origin != LoadOrigin::Restored {
            store.persist();
        }

        info!(
            "event=store_load module=store status=ok kind={} origin={:?} entities={}",
            kind,
            origin,
            store.doc.entity_count()
        );
        Ok(store)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn load_origin(&self) -> LoadOrigin {
        self.origin
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.persister.kind()
    }

    /// Serializes the full document now and hands it to the backend.
    ///
    /// The snapshot is taken synchronously; the write itself may complete
    /// later. Failures are logged and reported on the returned ticket.
    pub fn persist(&mut self) -> PersistTicket {
        match serde_json::to_vec(&self.doc) {
            Ok(snapshot) => self.persister.submit(snapshot),
            Err(err) => {
                error!(
                    "event=persist module=store status=error error_code=serialize_failed error={}",
                    err
                );
                PersistTicket::failed(PersistError::Serialize(err))
            }
        }
    }

    /// Inserts a company or replaces the one with the same id.
    ///
    /// On replace the stored `created_at` is kept and `updated_at` is bumped.
    pub fn upsert_company(&mut self, mut company: Company) -> StoreResult<Mutation<UpsertOutcome>> {
        if let Some(existing) = self.doc.company(company.company_id) {
            company.created_at = existing.created_at;
            company.updated_at = now_epoch_ms().max(company.created_at);
        }
        company.validate()?;

        let outcome = upsert_by(&mut self.doc.companies, company, |c| c.company_id);
        Ok(self.committed(outcome))
    }

    /// Removes the company. Touchpoints and transactions pointing at it are
    /// left in place and resolve to a placeholder name afterwards.
    pub fn delete_company(&mut self, company_id: CompanyId) -> Mutation<usize> {
        let removed = remove_by(&mut self.doc.companies, |c| c.company_id == company_id);
        self.committed(removed)
    }

    /// Inserts or replaces a touchpoint. New touchpoints must reference a
    /// live company; replacements may keep a dangling reference.
    pub fn upsert_touchpoint(
        &mut self,
        touchpoint: Touchpoint,
    ) -> StoreResult<Mutation<UpsertOutcome>> {
        let is_new = !self
            .doc
            .outreach
            .iter()
            .any(|touch| touch.outreach_id == touchpoint.outreach_id);
        if is_new && self.doc.company(touchpoint.company_id).is_none() {
            return Err(StoreError::UnknownCompany(touchpoint.company_id));
        }

        let outcome = upsert_by(&mut self.doc.outreach, touchpoint, |t| t.outreach_id);
        Ok(self.committed(outcome))
    }

    pub fn delete_touchpoint(&mut self, outreach_id: TouchpointId) -> Mutation<usize> {
        let removed = remove_by(&mut self.doc.outreach, |t| t.outreach_id == outreach_id);
        self.committed(removed)
    }

    pub fn upsert_transaction(
        &mut self,
        transaction: Transaction,
    ) -> StoreResult<Mutation<UpsertOutcome>> {
        transaction.validate()?;
        let outcome = upsert_by(&mut self.doc.transactions, transaction, |t| t.tx_id);
        Ok(self.committed(outcome))
    }

    pub fn delete_transaction(&mut self, tx_id: TransactionId) -> Mutation<usize> {
        let removed = remove_by(&mut self.doc.transactions, |t| t.tx_id == tx_id);
        self.committed(removed)
    }

    /// Saves the log for `log.date`, reusing the id of an existing log for
    /// that date so edits of one day's log keep a stable identity.
    pub fn upsert_log_by_date(
        &mut self,
        mut log: DailyLog,
    ) -> StoreResult<Mutation<UpsertOutcome>> {
        log.validate()?;
        if let Some(existing) = self.doc.logs.iter().find(|entry| entry.date == log.date) {
            log.log_id = existing.log_id;
        }

        let outcome = upsert_by(&mut self.doc.logs, log, |entry| entry.date);
        Ok(self.committed(outcome))
    }

    pub fn delete_log(&mut self, log_id: DailyLogId) -> Mutation<usize> {
        let removed = remove_by(&mut self.doc.logs, |entry| entry.log_id == log_id);
        self.committed(removed)
    }

    /// Replaces the persisted display preferences.
    pub fn set_ui_preferences(&mut self, ui: UiPreferences) -> PersistTicket {
        self.doc.ui = ui;
        self.persist()
    }

    /// Discards the document for a fresh demo document with new ids.
    pub fn reset_demo(&mut self) -> PersistTicket {
        self.doc = demo_document();
        info!(
            "event=reset_demo module=store status=ok entities={}",
            self.doc.entity_count()
        );
        self.persist()
    }

    /// Records a one-tap income entry dated `today`.
    pub fn quick_income(
        &mut self,
        amount: f64,
        today: NaiveDate,
    ) -> StoreResult<Mutation<TransactionId>> {
        let mut tx = Transaction::new(today, TransactionType::Income, amount);
        tx.category = "Quick".to_string();
        tx.description = "Quick add".to_string();
        let tx_id = tx.tx_id;

        let mutation = self.upsert_transaction(tx)?;
        Ok(Mutation {
            outcome: tx_id,
            persisted: mutation.persisted,
        })
    }

    /// Logs a quick call against the first company with a follow-up due in
    /// one day.
    pub fn quick_touch(&mut self, now: DateTime<Utc>) -> StoreResult<Mutation<TouchpointId>> {
        let company_id = self
            .doc
            .companies
            .first()
            .map(|company| company.company_id)
            .ok_or(StoreError::NoCompanies)?;

        let mut touch = Touchpoint::new(company_id, "Call", now);
        touch.template_name = "Quick".to_string();
        touch.subject = "Quick touch".to_string();
        touch.outcome = Outcome::NoReply;
        touch.next_follow_up_at = Some(now + Duration::days(1));
        let outreach_id = touch.outreach_id;

        let mutation = self.upsert_touchpoint(touch)?;
        Ok(Mutation {
            outcome: outreach_id,
            persisted: mutation.persisted,
        })
    }

    /// Pretty-printed export of the whole document.
    pub fn export_json(&self) -> StoreResult<String> {
        transfer::export_document(&self.doc).map_err(StoreError::Serialize)
    }

    /// Applies an external payload under `policy`.
    ///
    /// A payload that cannot be parsed leaves the document untouched.
    pub fn import_json(
        &mut self,
        payload: &str,
        policy: ImportPolicy,
    ) -> StoreResult<Mutation<ImportSummary>> {
        let incoming = transfer::parse_import(payload)?;
        let summary = transfer::apply_import(&mut self.doc, incoming, policy);
        info!(
            "event=import module=store status=ok policy={:?} companies={} outreach={} \
             transactions={} logs={} dropped={} rejected={}",
            policy,
            summary.companies,
            summary.outreach,
            summary.transactions,
            summary.logs,
            summary.dropped_collections.len(),
            summary.rejected_entities
        );
        Ok(self.committed(summary))
    }

    fn committed<T>(&mut self, outcome: T) -> Mutation<T> {
        Mutation {
            outcome,
            persisted: self.persist(),
        }
    }
}

fn load_document(backend: &dyn StorageBackend) -> (Document, LoadOrigin) {
    let key = backend.kind().state_key();
    match backend.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice::<Document>(&bytes) {
            Ok(doc) => (doc, LoadOrigin::Restored),
            Err(err) => {
                warn!(
                    "event=store_load module=store status=fallback reason=decode_failed error={}",
                    err
                );
                (demo_document(), LoadOrigin::SeededCorrupt)
            }
        },
        Ok(None) => (demo_document(), LoadOrigin::SeededEmpty),
        Err(err) => {
            warn!(
                "event=store_load module=store status=fallback reason=read_failed error={}",
                err
            );
            (demo_document(), LoadOrigin::SeededCorrupt)
        }
    }
}

fn upsert_by<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) -> UpsertOutcome {
    let wanted = key(&item);
    match items.iter().position(|existing| key(existing) == wanted) {
        Some(index) => {
            items[index] = item;
            UpsertOutcome::Replaced { index }
        }
        None => {
            items.push(item);
            UpsertOutcome::Inserted
        }
    }
}

fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|item| !matches(item));
    before - items.len()
}

#[cfg(test)]
mod tests {
    use super::{remove_by, upsert_by, UpsertOutcome};

    #[test]
    fn upsert_replaces_first_match_in_place() {
        let mut items = vec![(1, "a"), (2, "b"), (1, "c")];
        let outcome = upsert_by(&mut items, (1, "z"), |item| item.0);
        assert_eq!(outcome, UpsertOutcome::Replaced { index: 0 });
        assert_eq!(items, vec![(1, "z"), (2, "b"), (1, "c")]);

        assert_eq!(upsert_by(&mut items, (3, "d"), |item| item.0), UpsertOutcome::Inserted);
        assert_eq!(items.last(), Some(&(3, "d")));
    }

    #[test]
    fn remove_drops_every_match() {
        let mut items = vec![(1, "a"), (2, "b"), (1, "c")];
        assert_eq!(remove_by(&mut items, |item| item.0 == 1), 2);
        assert_eq!(items, vec![(2, "b")]);
    }
}
