// Funding aggregation engine.
//
// Pure functions over an in-memory slice of funding records: no I/O, no
// logging, no shared state. Malformed amounts count as zero and unrecognized
// nature/source labels simply miss their bucket.
use crate::catalog::{FineBucket, FundingNature, SourceClass};
use crate::types::{
    AreaFundingCross, AreaStats, CategoryStats, CentralFundingDetails, DetailedReport,
    DetailedStats, FundingRecord, GroupTotals, LocalFundingDetails, ProjectFundingSummary,
    ProvincialFundingDetails, SummaryReport, TotalStats,
};
use crate::util::coerce_amount;
use std::collections::HashMap;

/// Project summaries keyed by project code, iterated in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ProjectSummaries {
    index: HashMap<String, usize>,
    items: Vec<ProjectFundingSummary>,
}

impl ProjectSummaries {
    pub fn get(&self, project_code: &str) -> Option<&ProjectFundingSummary> {
        self.index.get(project_code).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectFundingSummary> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<ProjectFundingSummary> {
        self.items
    }

    fn entry(&mut self, project_code: &str) -> &mut ProjectFundingSummary {
        let i = match self.index.get(project_code) {
            Some(&i) => i,
            None => {
                self.items.push(ProjectFundingSummary {
                    project_code: project_code.to_string(),
                    ..Default::default()
                });
                let i = self.items.len() - 1;
                self.index.insert(project_code.to_string(), i);
                i
            }
        };
        &mut self.items[i]
    }
}

/// Single pass over `records`, one summary per distinct `project_code`.
///
/// Descriptive fields and `budget_amount` are last-write-wins; amounts are
/// additive. `total_funding` is recomputed from the three nature totals after
/// every record.
pub fn build_project_summaries(records: &[FundingRecord]) -> ProjectSummaries {
    let mut summaries = ProjectSummaries::default();
    for r in records {
        let s = summaries.entry(&r.project_code);
        s.project_name = r.project_name.clone();
        s.area = r.area.clone();
        s.category = r.category.clone();
        s.construction_unit = r.construction_unit.clone();
        s.department = r.department.clone();
        s.budget_amount = r.budget_amount.clone();

        let amount = coerce_amount(r.funding_amount.as_ref());

        // Nature and source are trusted independently; each drives its own bucket.
        if let Some(nature) = FundingNature::from_label(&r.funding_nature) {
            *s.nature_total_mut(nature) += amount;
        }
        if let Some(bucket) = SourceClass::classify(&r.funding_source).bucket() {
            *s.bucket_mut(bucket) += amount;
        }

        s.total_funding = s.local_funding + s.central_funding + s.provincial_funding;
    }
    summaries
}

/// Insertion-ordered grouping of summaries by a string key.
fn group_by<'a, F>(summaries: &'a [ProjectFundingSummary], key: F) -> Vec<(String, GroupTotals)>
where
    F: Fn(&'a ProjectFundingSummary) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, GroupTotals)> = Vec::new();
    for s in summaries {
        let k = key(s);
        let i = *index.entry(k).or_insert_with(|| {
            groups.push((k.to_string(), GroupTotals::default()));
            groups.len() - 1
        });
        groups[i].1.add(s);
    }
    groups
}

pub fn generate_summary_report(records: &[FundingRecord]) -> SummaryReport {
    let project_summaries = build_project_summaries(records).into_vec();

    let total_stats = project_summaries.iter().fold(
        TotalStats::default(),
        |mut acc, s| {
            acc.total_projects += 1;
            acc.total_budget += coerce_amount(s.budget_amount.as_ref());
            acc.total_funding += s.total_funding;
            acc.total_local_funding += s.local_funding;
            acc.total_central_funding += s.central_funding;
            acc.total_provincial_funding += s.provincial_funding;
            acc
        },
    );

    let area_stats = group_by(&project_summaries, |s| s.area.as_str())
        .into_iter()
        .map(|(area, totals)| AreaStats { area, totals })
        .collect();
    let category_stats = group_by(&project_summaries, |s| s.category.as_str())
        .into_iter()
        .map(|(category, totals)| CategoryStats { category, totals })
        .collect();

    SummaryReport {
        project_summaries,
        total_stats,
        area_stats,
        category_stats,
    }
}

impl LocalFundingDetails {
    fn add(&mut self, s: &ProjectFundingSummary) {
        self.total += s.local_funding;
        self.general_bonds += s.bucket(FineBucket::LocalGeneralBonds);
        self.special_bonds += s.bucket(FineBucket::LocalSpecialBonds);
        self.land_sale_revenue += s.bucket(FineBucket::LandSaleRevenue);
        self.general_public_budget += s.bucket(FineBucket::GeneralPublicBudget);
    }
}

impl CentralFundingDetails {
    fn add(&mut self, s: &ProjectFundingSummary) {
        self.total += s.central_funding;
        self.budget_investment += s.bucket(FineBucket::CentralBudgetInvestment);
        self.subsidy += s.bucket(FineBucket::CentralSubsidy);
        self.special_funds += s.bucket(FineBucket::CentralSpecialFunds);
        self.treasury_bonds += s.bucket(FineBucket::TreasuryBonds);
        self.ultra_long_treasury_bonds += s.bucket(FineBucket::UltraLongTreasuryBonds);
        self.anti_epidemic_bonds += s.bucket(FineBucket::AntiEpidemicBonds);
    }
}

impl ProvincialFundingDetails {
    fn add(&mut self, s: &ProjectFundingSummary) {
        self.total += s.provincial_funding;
        self.subsidy += s.bucket(FineBucket::ProvincialSubsidy);
        self.special_funds += s.bucket(FineBucket::ProvincialSpecialFunds);
    }
}

impl DetailedStats {
    fn add(&mut self, s: &ProjectFundingSummary) {
        self.local_funding_details.add(s);
        self.central_funding_details.add(s);
        self.provincial_funding_details.add(s);
    }
}

pub fn generate_detailed_report(records: &[FundingRecord]) -> DetailedReport {
    let project_summaries = build_project_summaries(records).into_vec();

    let mut detailed_stats = DetailedStats::default();
    for s in &project_summaries {
        detailed_stats.add(s);
    }

    let mut cross: Vec<AreaFundingCross> = Vec::new();
    {
        let mut index: HashMap<&str, usize> = HashMap::new();
        for s in &project_summaries {
            let i = *index.entry(s.area.as_str()).or_insert_with(|| {
                cross.push(AreaFundingCross {
                    area: s.area.clone(),
                    ..Default::default()
                });
                cross.len() - 1
            });
            let c = &mut cross[i];
            c.local_funding.add(s);
            c.central_funding.add(s);
            c.provincial_funding.add(s);
        }
    }

    DetailedReport {
        project_summaries,
        detailed_stats,
        area_funding_cross_stats: cross,
    }
}

/// Deterministic display order: project code, then project name.
pub fn sort_summaries(summaries: &mut [ProjectFundingSummary]) {
    summaries.sort_by(|a, b| {
        a.project_code
            .cmp(&b.project_code)
            .then_with(|| a.project_name.cmp(&b.project_name))
    });
}
