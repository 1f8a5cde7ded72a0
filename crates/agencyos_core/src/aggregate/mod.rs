//! Derived read views over a document snapshot.
//!
//! # Responsibility
//! - Compute pipeline, finance, follow-up and activity rollups on demand.
//! - Provide the filter/sort views consumed by screens.
//!
//! # Invariants
//! - Every function is pure: same inputs, same output, no mutation.
//! - "Now" is always an explicit parameter, never read from the clock.
//! - Soft references are resolved through `resolve_company_name` only.

pub mod finance;
pub mod followups;
pub mod pipeline;
pub mod views;
pub mod weekly;

use crate::model::company::{Company, CompanyId};

/// Display name for a touchpoint whose company no longer exists.
pub const UNKNOWN_COMPANY: &str = "Unknown";
/// Display name for transactions with no (or a dangling) company.
pub const UNASSIGNED_COMPANY: &str = "Unassigned";

/// Resolves a soft company reference to a display name.
///
/// Returns `fallback` when `company_id` is `None` or names no live company.
pub fn resolve_company_name<'a>(
    companies: &'a [Company],
    company_id: Option<CompanyId>,
    fallback: &'a str,
) -> &'a str {
    company_id
        .and_then(|id| companies.iter().find(|company| company.company_id == id))
        .map_or(fallback, |company| company.company_name.as_str())
}
