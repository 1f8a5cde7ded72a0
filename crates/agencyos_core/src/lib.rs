//! Local-first state engine for a single-operator agency CRM.
//!
//! The crate owns the whole document (companies, outreach, transactions,
//! daily logs, display preferences), persists it through the best available
//! backend and derives every dashboard figure from it on demand.

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod logging;
pub mod model;
pub mod seed;
pub mod store;
pub mod transfer;

pub use backend::{select_backend, BackendError, BackendKind, StorageBackend};
pub use config::StorageConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::company::{Company, CompanyId, CompanyStatus};
pub use model::daily_log::{DailyLog, DailyLogId, LogMetrics};
pub use model::document::{Document, RangeBucket, UiPreferences};
pub use model::touchpoint::{Outcome, Touchpoint, TouchpointId};
pub use model::transaction::{RecurrenceInterval, Transaction, TransactionId, TransactionType};
pub use model::ValidationError;
pub use store::{
    LoadOrigin, Mutation, PersistError, PersistTicket, StateStore, StoreError, StoreResult,
    UpsertOutcome,
};
pub use transfer::{ImportError, ImportPolicy, ImportSummary, EXPORT_FILE_NAME};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
