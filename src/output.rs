use crate::error::{Error, Result};
use crate::store::Dataset;
use crate::types::{
    AreaFundingCross, AreaStats, CategoryStats, DetailedExportRow, DetailedReport, DetailedStats,
    FundingLedgerRow, FundingRecord, GroupStatsRow, GroupTotals, KeyProject, KeyProjectRow,
    ProjectFundingSummary, ProjectInfo, ProjectRegistryRow, SummaryExportRow, SummaryReport,
    TotalStats,
};
use crate::util::{coerce_amount, format_amount, raw_amount_text};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| Error::io(e, path))?;
    info!(path = %path.display(), rows = rows.len(), "wrote csv");
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| Error::io(e, path))?;
    info!(path = %path.display(), "wrote json");
    Ok(())
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

pub fn summary_export_rows(summaries: &[ProjectFundingSummary]) -> Vec<SummaryExportRow> {
    summaries
        .iter()
        .map(|s| SummaryExportRow {
            project_name: s.project_name.clone(),
            project_code: s.project_code.clone(),
            area: s.area.clone(),
            category: s.category.clone(),
            construction_unit: s.construction_unit.clone(),
            department: s.department.clone(),
            budget_amount: format_amount(Some(coerce_amount(s.budget_amount.as_ref()))),
            local_funding: format_amount(Some(s.local_funding)),
            central_funding: format_amount(Some(s.central_funding)),
            provincial_funding: format_amount(Some(s.provincial_funding)),
            total_funding: format_amount(Some(s.total_funding)),
        })
        .collect()
}

pub fn detailed_export_rows(summaries: &[ProjectFundingSummary]) -> Vec<DetailedExportRow> {
    let fmt = |v: f64| format_amount(Some(v));
    summaries
        .iter()
        .map(|s| DetailedExportRow {
            project_name: s.project_name.clone(),
            project_code: s.project_code.clone(),
            area: s.area.clone(),
            category: s.category.clone(),
            local_general_bonds: fmt(s.local_general_bonds),
            local_special_bonds: fmt(s.local_special_bonds),
            land_sale_revenue: fmt(s.land_sale_revenue),
            general_public_budget: fmt(s.general_public_budget),
            central_budget_investment: fmt(s.central_budget_investment),
            central_subsidy: fmt(s.central_subsidy),
            central_special_funds: fmt(s.central_special_funds),
            treasury_bonds: fmt(s.treasury_bonds),
            ultra_long_treasury_bonds: fmt(s.ultra_long_treasury_bonds),
            anti_epidemic_bonds: fmt(s.anti_epidemic_bonds),
            provincial_subsidy: fmt(s.provincial_subsidy),
            provincial_special_funds: fmt(s.provincial_special_funds),
        })
        .collect()
}

fn group_row(group: &str, t: &GroupTotals) -> GroupStatsRow {
    GroupStatsRow {
        group: group.to_string(),
        project_count: t.project_count,
        total_funding: format_amount(Some(t.total_funding)),
        local_funding: format_amount(Some(t.local_funding)),
        central_funding: format_amount(Some(t.central_funding)),
        provincial_funding: format_amount(Some(t.provincial_funding)),
    }
}

pub fn area_stats_rows(stats: &[AreaStats]) -> Vec<GroupStatsRow> {
    stats.iter().map(|a| group_row(&a.area, &a.totals)).collect()
}

pub fn category_stats_rows(stats: &[CategoryStats]) -> Vec<GroupStatsRow> {
    stats
        .iter()
        .map(|c| group_row(&c.category, &c.totals))
        .collect()
}

pub const SUMMARY_CSV: &str = "report_summary.csv";
pub const DETAILED_CSV: &str = "report_detailed.csv";
pub const AREA_CSV: &str = "report_area_stats.csv";
pub const CATEGORY_CSV: &str = "report_category_stats.csv";
pub const DIGEST_JSON: &str = "report_digest.json";

/// Aggregates of both reports without the per-project rows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDigest<'a> {
    pub generated_at: DateTime<Local>,
    pub total_stats: &'a TotalStats,
    pub area_stats: &'a [AreaStats],
    pub category_stats: &'a [CategoryStats],
    pub detailed_stats: &'a DetailedStats,
    pub area_funding_cross_stats: &'a [AreaFundingCross],
}

/// Write every report file into `out_dir` and return the paths written.
pub fn export_reports(
    summary: &SummaryReport,
    detailed: &DetailedReport,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|e| Error::io(e, out_dir))?;
    let path = |name: &str| out_dir.join(name);

    write_csv(path(SUMMARY_CSV), &summary_export_rows(&summary.project_summaries))?;
    write_csv(path(DETAILED_CSV), &detailed_export_rows(&detailed.project_summaries))?;
    write_csv(path(AREA_CSV), &area_stats_rows(&summary.area_stats))?;
    write_csv(path(CATEGORY_CSV), &category_stats_rows(&summary.category_stats))?;

    let digest = ReportDigest {
        generated_at: Local::now(),
        total_stats: &summary.total_stats,
        area_stats: &summary.area_stats,
        category_stats: &summary.category_stats,
        detailed_stats: &detailed.detailed_stats,
        area_funding_cross_stats: &detailed.area_funding_cross_stats,
    };
    write_json(path(DIGEST_JSON), &digest)?;

    Ok([SUMMARY_CSV, DETAILED_CSV, AREA_CSV, CATEGORY_CSV, DIGEST_JSON]
        .iter()
        .map(|&n| path(n))
        .collect())
}

pub fn funding_ledger_rows(records: &[FundingRecord]) -> Vec<FundingLedgerRow> {
    records
        .iter()
        .map(|r| FundingLedgerRow {
            project_name: r.project_name.clone(),
            project_code: r.project_code.clone(),
            area: r.area.clone(),
            category: r.category.clone(),
            construction_unit: r.construction_unit.clone(),
            department: r.department.clone(),
            budget_amount: raw_amount_text(r.budget_amount.as_ref()),
            funding_amount: raw_amount_text(r.funding_amount.as_ref()),
            approval_date: r.approval_date.clone(),
            funding_source: r.funding_source.clone(),
            funding_nature: r.funding_nature.clone(),
            document_number: r.document_number.clone(),
            operator: r.operator.clone(),
            operator_department: r.operator_department.clone(),
            status: r.status.clone(),
            remark: r.remark.clone(),
        })
        .collect()
}

pub fn project_registry_rows(projects: &[ProjectInfo]) -> Vec<ProjectRegistryRow> {
    projects
        .iter()
        .map(|p| ProjectRegistryRow {
            project_name: p.project_name.clone(),
            project_code: p.project_code.clone(),
            area: p.area.clone(),
            category: p.category.clone(),
            construction_unit: p.construction_unit.clone(),
            department: p.department.clone(),
            approval_time: p.approval_time.clone(),
            budget_amount: raw_amount_text(p.budget_amount.as_ref()),
            start_time: p.start_time.clone(),
            end_time: p.end_time.clone(),
            status: p.status.clone(),
        })
        .collect()
}

pub fn key_project_rows(projects: &[KeyProject]) -> Vec<KeyProjectRow> {
    projects
        .iter()
        .map(|k| KeyProjectRow {
            project_name: k.project_name.clone(),
            project_code: k.project_code.clone(),
            area: k.area.clone(),
            category: k.category.clone(),
            priority_level: k.priority_level.clone(),
            construction_unit: k.construction_unit.clone(),
            department: k.department.clone(),
            total_investment: raw_amount_text(k.total_investment.as_ref()),
            construction_period: k.construction_period.clone(),
            status: k.status.clone(),
            description: k.description.clone(),
        })
        .collect()
}

pub const FUNDING_LEDGER_CSV: &str = "funding_arrangement_export.csv";
pub const PROJECT_REGISTRY_CSV: &str = "project_info_export.csv";
pub const KEY_PROJECTS_CSV: &str = "key_projects_export.csv";

/// Write each non-empty stored table into `out_dir` with the import template
/// headers. Empty tables are skipped; the returned paths list what was written.
pub fn export_tables(data: &Dataset, out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|e| Error::io(e, out_dir))?;
    let mut written = Vec::new();

    if !data.funding_arrangement.is_empty() {
        let path = out_dir.join(FUNDING_LEDGER_CSV);
        write_csv(&path, &funding_ledger_rows(&data.funding_arrangement))?;
        written.push(path);
    }
    if !data.project_info.is_empty() {
        let path = out_dir.join(PROJECT_REGISTRY_CSV);
        write_csv(&path, &project_registry_rows(&data.project_info))?;
        written.push(path);
    }
    if !data.key_projects.is_empty() {
        let path = out_dir.join(KEY_PROJECTS_CSV);
        write_csv(&path, &key_project_rows(&data.key_projects))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FineBucket;
    use crate::loader::{load_funding_csv, load_key_projects_csv};
    use crate::reports::{generate_detailed_report, generate_summary_report};
    use crate::types::RawAmount;

    fn records() -> Vec<FundingRecord> {
        vec![
            FundingRecord {
                project_code: "2024A0001".to_string(),
                project_name: "河道治理工程".to_string(),
                area: "县城".to_string(),
                category: "环保项目".to_string(),
                budget_amount: Some(RawAmount::Text("15000".to_string())),
                funding_amount: Some(RawAmount::Number(12345.0)),
                funding_source: "中央-中央预算内投资".to_string(),
                funding_nature: "中央".to_string(),
                ..Default::default()
            },
            FundingRecord {
                project_code: "2024A0001".to_string(),
                project_name: "河道治理工程".to_string(),
                area: "县城".to_string(),
                category: "环保项目".to_string(),
                budget_amount: Some(RawAmount::Text("15000".to_string())),
                funding_amount: Some(RawAmount::Number(500.5)),
                funding_source: "省级-省级专项".to_string(),
                funding_nature: "省级".to_string(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn summary_rows_format_amounts() {
        let report = generate_summary_report(&records());
        let rows = summary_export_rows(&report.project_summaries);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].budget_amount, "15,000");
        assert_eq!(rows[0].central_funding, "12,345");
        assert_eq!(rows[0].provincial_funding, "500.5");
        assert_eq!(rows[0].local_funding, "0");
        assert_eq!(rows[0].total_funding, "12,845.5");
    }

    #[test]
    fn detailed_rows_carry_every_bucket() {
        let report = generate_summary_report(&records());
        let rows = detailed_export_rows(&report.project_summaries);
        assert_eq!(rows[0].central_budget_investment, "12,345");
        assert_eq!(rows[0].provincial_special_funds, "500.5");
        assert_eq!(rows[0].treasury_bonds, "0");
    }

    #[test]
    fn csv_uses_template_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let report = generate_summary_report(&records());
        write_csv(&path, &summary_export_rows(&report.project_summaries)).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert!(header.starts_with("项目名称,项目编码,所属区域"));
        assert!(header.ends_with("资金总计(万元)"));
        assert!(contents.contains("\"12,845.5\""));
    }

    #[test]
    fn json_report_is_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_json(&path, &generate_summary_report(&records())).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["totalStats"]["totalProjects"], 1);
        assert_eq!(value["areaStats"][0]["area"], "县城");
        assert_eq!(value["areaStats"][0]["projectCount"], 1);
        assert_eq!(value["projectSummaries"][0]["centralBudgetInvestment"], 12345.0);
    }

    #[test]
    fn group_rows_and_table_rendering() {
        let report = generate_summary_report(&records());
        let rows = category_stats_rows(&report.category_stats);
        assert_eq!(rows[0].group, "环保项目");
        assert_eq!(rows[0].project_count, 1);
        let table = render_table(&area_stats_rows(&report.area_stats), 5).unwrap();
        assert!(table.contains("县城"));
        assert!(render_table::<GroupStatsRow>(&[], 5).is_none());
    }

    #[test]
    fn export_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let records = records();
        let summary = generate_summary_report(&records);
        let detailed = generate_detailed_report(&records);
        let written = export_reports(&summary, &detailed, &out).unwrap();
        assert_eq!(written.len(), 5);
        for p in &written {
            assert!(p.exists(), "{}", p.display());
        }
        let digest: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join(DIGEST_JSON)).unwrap()).unwrap();
        assert!(digest["generatedAt"].is_string());
        assert_eq!(
            digest["detailedStats"]["provincialFundingDetails"]["specialFunds"],
            500.5
        );
        assert_eq!(digest["areaFundingCrossStats"][0]["area"], "县城");
    }

    #[test]
    fn detailed_headers_follow_bucket_labels() {
        let headers = DetailedExportRow::headers();
        let bucket_headers: Vec<&str> = headers[4..].iter().map(|h| &h[..]).collect();
        let labels: Vec<&str> = FineBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(bucket_headers, labels);
    }

    #[test]
    fn exported_ledger_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = Dataset::default();
        data.funding_arrangement = records();
        data.funding_arrangement[1].approval_date = "2024-06-01".to_string();
        data.key_projects.push(KeyProject {
            project_name: "地铁二号线".to_string(),
            project_code: "2024K0001".to_string(),
            priority_level: "省级".to_string(),
            total_investment: Some(RawAmount::Number(250000.0)),
            ..Default::default()
        });

        let written = export_tables(&data, dir.path()).unwrap();
        assert_eq!(
            written,
            vec![dir.path().join(FUNDING_LEDGER_CSV), dir.path().join(KEY_PROJECTS_CSV)]
        );
        assert!(!dir.path().join(PROJECT_REGISTRY_CSV).exists());

        let (ledger, report) = load_funding_csv(dir.path().join(FUNDING_LEDGER_CSV)).unwrap();
        assert_eq!(report.parse_errors, 0);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].funding_amount, Some(RawAmount::from("12345")));
        assert_eq!(ledger[1].budget_amount, Some(RawAmount::from("15000")));
        assert_eq!(ledger[1].approval_date, "2024-06-01");
        assert_eq!(ledger[1].funding_source, "省级-省级专项");
        assert_eq!(
            generate_summary_report(&ledger).total_stats,
            generate_summary_report(&data.funding_arrangement).total_stats
        );

        let (keys, _) = load_key_projects_csv(dir.path().join(KEY_PROJECTS_CSV)).unwrap();
        assert_eq!(keys[0].total_investment, Some(RawAmount::from("250000")));
        assert_eq!(keys[0].priority_level, "省级");
    }
}
