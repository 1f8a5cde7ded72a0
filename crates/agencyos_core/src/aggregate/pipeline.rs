//! Pipeline totals by company status.

use crate::model::company::{Company, CompanyStatus};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PipelineTotal {
    /// Sum of `deal_value` over members.
    pub value: f64,
    pub count: usize,
}

/// Groups companies by status, summing deal value and counting members.
///
/// Statuses without members are omitted unless listed in `seed`, in which
/// case they appear with zero totals. Keys iterate in pipeline order.
pub fn pipeline_totals(
    companies: &[Company],
    seed: &[CompanyStatus],
) -> BTreeMap<CompanyStatus, PipelineTotal> {
    let mut totals: BTreeMap<CompanyStatus, PipelineTotal> = seed
        .iter()
        .map(|status| (*status, PipelineTotal::default()))
        .collect();

    for company in companies {
        let entry = totals.entry(company.status).or_default();
        entry.value += company.deal_value;
        entry.count += 1;
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::{pipeline_totals, PipelineTotal};
    use crate::model::company::{Company, CompanyStatus};

    fn company(status: CompanyStatus, deal_value: f64) -> Company {
        let mut company = Company::new("c");
        company.status = status;
        company.deal_value = deal_value;
        company
    }

    #[test]
    fn empty_statuses_are_omitted_without_seed() {
        let companies = vec![
            company(CompanyStatus::MeetingSet, 65_000.0),
            company(CompanyStatus::Lead, 18_000.0),
        ];
        let totals = pipeline_totals(&companies, &[]);

        assert_eq!(totals.len(), 2);
        assert_eq!(
            totals[&CompanyStatus::MeetingSet],
            PipelineTotal {
                value: 65_000.0,
                count: 1
            }
        );
        assert_eq!(
            totals[&CompanyStatus::Lead],
            PipelineTotal {
                value: 18_000.0,
                count: 1
            }
        );
        let order: Vec<_> = totals.keys().copied().collect();
        assert_eq!(order, vec![CompanyStatus::Lead, CompanyStatus::MeetingSet]);
    }

    #[test]
    fn seeding_with_all_statuses_zero_fills() {
        let companies = vec![company(CompanyStatus::Won, 5.0), company(CompanyStatus::Won, 7.0)];
        let totals = pipeline_totals(&companies, &CompanyStatus::ALL);

        assert_eq!(totals.len(), CompanyStatus::ALL.len());
        assert_eq!(totals[&CompanyStatus::Lost], PipelineTotal::default());
        assert_eq!(totals[&CompanyStatus::Won].count, 2);
        assert_eq!(totals[&CompanyStatus::Won].value, 12.0);
    }
}
