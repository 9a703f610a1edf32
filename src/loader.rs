use crate::error::{Error, Result};
use crate::types::{FundingRecord, KeyProject, ProjectInfo, RawAmount};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, warn};

/// Funding sheet row as exported from the spreadsheet template.
#[derive(Debug, Deserialize)]
struct RawFundingRow {
    #[serde(rename = "项目名称")]
    project_name: Option<String>,
    #[serde(rename = "项目编码")]
    project_code: Option<String>,
    #[serde(rename = "所属区域")]
    area: Option<String>,
    #[serde(rename = "项目类别")]
    category: Option<String>,
    #[serde(rename = "建设单位")]
    construction_unit: Option<String>,
    #[serde(rename = "项目主管部门")]
    department: Option<String>,
    #[serde(rename = "概算批复金额")]
    budget_amount: Option<String>,
    #[serde(rename = "资金批复金额")]
    funding_amount: Option<String>,
    #[serde(rename = "批复日期")]
    approval_date: Option<String>,
    #[serde(rename = "资金具体来源")]
    funding_source: Option<String>,
    #[serde(rename = "资金性质")]
    funding_nature: Option<String>,
    #[serde(rename = "财预文号")]
    document_number: Option<String>,
    #[serde(rename = "经办人")]
    operator: Option<String>,
    #[serde(rename = "经办处室")]
    operator_department: Option<String>,
    #[serde(rename = "项目状态")]
    status: Option<String>,
    #[serde(rename = "备注")]
    remark: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProjectRow {
    #[serde(rename = "项目名称")]
    project_name: Option<String>,
    #[serde(rename = "项目编码")]
    project_code: Option<String>,
    #[serde(rename = "所属区域")]
    area: Option<String>,
    #[serde(rename = "项目类别")]
    category: Option<String>,
    #[serde(rename = "建设单位")]
    construction_unit: Option<String>,
    #[serde(rename = "项目主管部门")]
    department: Option<String>,
    #[serde(rename = "立项时间")]
    approval_time: Option<String>,
    #[serde(rename = "概算批复金额")]
    budget_amount: Option<String>,
    #[serde(rename = "（预计）开工时间")]
    start_time: Option<String>,
    #[serde(rename = "（预计）完工时间")]
    end_time: Option<String>,
    #[serde(rename = "项目状态")]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawKeyProjectRow {
    #[serde(rename = "项目名称")]
    project_name: Option<String>,
    #[serde(rename = "项目编码")]
    project_code: Option<String>,
    #[serde(rename = "所属区域")]
    area: Option<String>,
    #[serde(rename = "项目类别")]
    category: Option<String>,
    #[serde(rename = "重点等级")]
    priority_level: Option<String>,
    #[serde(rename = "建设单位")]
    construction_unit: Option<String>,
    #[serde(rename = "项目主管部门")]
    department: Option<String>,
    #[serde(rename = "总投资(万元)")]
    total_investment: Option<String>,
    #[serde(rename = "建设周期")]
    construction_period: Option<String>,
    #[serde(rename = "项目状态")]
    status: Option<String>,
    #[serde(rename = "项目描述")]
    description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

fn text(v: Option<String>) -> String {
    v.map(|s| s.trim().to_string()).unwrap_or_default()
}

// Cells stay as text so the engine's coercion decides what they are worth.
fn amount(v: Option<String>) -> Option<RawAmount> {
    let s = text(v);
    if s.is_empty() {
        None
    } else {
        Some(RawAmount::Text(s))
    }
}

impl From<RawFundingRow> for FundingRecord {
    fn from(row: RawFundingRow) -> Self {
        FundingRecord {
            project_code: text(row.project_code),
            project_name: text(row.project_name),
            area: text(row.area),
            category: text(row.category),
            construction_unit: text(row.construction_unit),
            department: text(row.department),
            budget_amount: amount(row.budget_amount),
            funding_amount: amount(row.funding_amount),
            funding_source: text(row.funding_source),
            funding_nature: text(row.funding_nature),
            approval_date: text(row.approval_date),
            document_number: text(row.document_number),
            operator: text(row.operator),
            operator_department: text(row.operator_department),
            status: text(row.status),
            remark: text(row.remark),
        }
    }
}

impl From<RawProjectRow> for ProjectInfo {
    fn from(row: RawProjectRow) -> Self {
        ProjectInfo {
            project_name: text(row.project_name),
            project_code: text(row.project_code),
            area: text(row.area),
            category: text(row.category),
            construction_unit: text(row.construction_unit),
            department: text(row.department),
            approval_time: text(row.approval_time),
            budget_amount: amount(row.budget_amount),
            start_time: text(row.start_time),
            end_time: text(row.end_time),
            status: text(row.status),
        }
    }
}

impl From<RawKeyProjectRow> for KeyProject {
    fn from(row: RawKeyProjectRow) -> Self {
        KeyProject {
            project_name: text(row.project_name),
            project_code: text(row.project_code),
            area: text(row.area),
            category: text(row.category),
            priority_level: text(row.priority_level),
            construction_unit: text(row.construction_unit),
            department: text(row.department),
            total_investment: amount(row.total_investment),
            construction_period: text(row.construction_period),
            status: text(row.status),
            description: text(row.description),
        }
    }
}

fn load_rows<R, T>(path: &Path) -> Result<(Vec<T>, LoadReport)>
where
    R: for<'de> Deserialize<'de>,
    T: From<R>,
{
    let file = File::open(path).map_err(|e| Error::io(e, path))?;
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(file);
    let mut report = LoadReport::default();
    let mut rows = Vec::new();

    for result in rdr.deserialize::<R>() {
        report.total_rows += 1;
        match result {
            Ok(r) => rows.push(T::from(r)),
            Err(e) => {
                debug!(row = report.total_rows, error = %e, "skipping unreadable row");
                report.parse_errors += 1;
            }
        }
    }
    report.loaded_rows = rows.len();
    if report.parse_errors > 0 {
        warn!(path = %path.display(), skipped = report.parse_errors, "some rows could not be read");
    }
    info!(path = %path.display(), rows = report.loaded_rows, "loaded csv");
    Ok((rows, report))
}

/// Read a funding-arrangement sheet. Unreadable rows are counted and
/// skipped; cell contents are otherwise taken as-is.
pub fn load_funding_csv(path: impl AsRef<Path>) -> Result<(Vec<FundingRecord>, LoadReport)> {
    load_rows::<RawFundingRow, FundingRecord>(path.as_ref())
}

pub fn load_project_csv(path: impl AsRef<Path>) -> Result<(Vec<ProjectInfo>, LoadReport)> {
    load_rows::<RawProjectRow, ProjectInfo>(path.as_ref())
}

pub fn load_key_projects_csv(path: impl AsRef<Path>) -> Result<(Vec<KeyProject>, LoadReport)> {
    load_rows::<RawKeyProjectRow, KeyProject>(path.as_ref())
}
