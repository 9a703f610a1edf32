// Ingestion-time validation for imported rows.
//
// The aggregation engine accepts anything; this is where bad data gets
// reported. Every rule runs on every row, so the caller sees all problems at
// once instead of the first one.
use crate::catalog::{
    FundingNature, FundingSource, AREA_OPTIONS, CONSTRUCTION_UNIT_OPTIONS, DEPARTMENT_OPTIONS,
    PRIORITY_LEVEL_OPTIONS, PROJECT_CATEGORY_OPTIONS, PROJECT_STATUS_OPTIONS,
};
use crate::types::{FundingRecord, KeyProject, ProjectInfo, RawAmount};
use crate::util::{amount_is_blank, parse_amount_text, parse_date_safe};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// 1-based row number within the imported batch.
    pub row: usize,
    pub level: IssueLevel,
    /// Spreadsheet column header of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IssueLevel::Error => "error",
            IssueLevel::Warning => "warning",
        };
        write!(f, "row {} [{}] {}: {}", self.row, level, self.field, self.message)
    }
}

pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.level == IssueLevel::Error)
}

fn missing(row: usize, field: &'static str) -> ValidationIssue {
    ValidationIssue {
        row,
        level: IssueLevel::Error,
        field,
        message: "required field is missing".to_string(),
    }
}

// Off-catalogue values are allowed (reports group them as-is) but flagged.
fn check_option(
    issues: &mut Vec<ValidationIssue>,
    row: usize,
    field: &'static str,
    value: &str,
    options: &[&str],
) {
    if !value.is_empty() && !options.contains(&value) {
        issues.push(ValidationIssue {
            row,
            level: IssueLevel::Warning,
            field,
            message: format!("value not in option list: {}", value),
        });
    }
}

fn require_text(issues: &mut Vec<ValidationIssue>, row: usize, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        issues.push(missing(row, field));
    }
}

pub fn validate_funding_rows(rows: &[FundingRecord]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (idx, r) in rows.iter().enumerate() {
        let row = idx + 1;
        require_text(&mut issues, row, "项目名称", &r.project_name);
        require_text(&mut issues, row, "项目编码", &r.project_code);
        if amount_is_blank(r.funding_amount.as_ref()) {
            issues.push(missing(row, "资金批复金额"));
        }
        require_text(&mut issues, row, "资金具体来源", &r.funding_source);
        require_text(&mut issues, row, "资金性质", &r.funding_nature);

        let source = FundingSource::from_label(&r.funding_source);
        if source.is_none() && !r.funding_source.trim().is_empty() {
            issues.push(ValidationIssue {
                row,
                level: IssueLevel::Error,
                field: "资金具体来源",
                message: format!("unknown funding source: {}", r.funding_source),
            });
        }

        let nature = FundingNature::from_label(&r.funding_nature);
        if nature.is_none() && !r.funding_nature.trim().is_empty() {
            issues.push(ValidationIssue {
                row,
                level: IssueLevel::Error,
                field: "资金性质",
                message: format!("unknown funding nature: {}", r.funding_nature),
            });
        }

        if let Some(RawAmount::Text(s)) = &r.funding_amount {
            if !s.trim().is_empty() && parse_amount_text(s).is_none() {
                issues.push(ValidationIssue {
                    row,
                    level: IssueLevel::Error,
                    field: "资金批复金额",
                    message: format!("amount is not a number: {}", s),
                });
            }
        }

        // Both fields are kept as entered; the mismatch is only surfaced.
        if let (Some(src), Some(nat)) = (source, nature) {
            if src.nature() != nat {
                issues.push(ValidationIssue {
                    row,
                    level: IssueLevel::Warning,
                    field: "资金性质",
                    message: format!(
                        "source {} implies nature {}, row states {}",
                        src.label(),
                        src.nature().label(),
                        nat.label()
                    ),
                });
            }
        }

        if !r.approval_date.trim().is_empty() && parse_date_safe(&r.approval_date).is_none() {
            issues.push(ValidationIssue {
                row,
                level: IssueLevel::Warning,
                field: "批复日期",
                message: format!("expected YYYY-MM-DD, got {}", r.approval_date),
            });
        }
    }
    issues
}

pub fn validate_project_rows(rows: &[ProjectInfo]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (idx, p) in rows.iter().enumerate() {
        let row = idx + 1;
        require_text(&mut issues, row, "项目名称", &p.project_name);
        require_text(&mut issues, row, "项目编码", &p.project_code);
        require_text(&mut issues, row, "所属区域", &p.area);
        require_text(&mut issues, row, "项目类别", &p.category);
        require_text(&mut issues, row, "建设单位", &p.construction_unit);
        require_text(&mut issues, row, "项目主管部门", &p.department);
        check_option(&mut issues, row, "所属区域", &p.area, &AREA_OPTIONS);
        check_option(&mut issues, row, "项目类别", &p.category, &PROJECT_CATEGORY_OPTIONS);
        check_option(&mut issues, row, "建设单位", &p.construction_unit, &CONSTRUCTION_UNIT_OPTIONS);
        check_option(&mut issues, row, "项目主管部门", &p.department, &DEPARTMENT_OPTIONS);
        check_status(&mut issues, row, &p.status);
    }
    issues
}

fn check_status(issues: &mut Vec<ValidationIssue>, row: usize, status: &str) {
    if !status.is_empty() && !PROJECT_STATUS_OPTIONS.contains(&status) {
        issues.push(ValidationIssue {
            row,
            level: IssueLevel::Error,
            field: "项目状态",
            message: format!("unknown project status: {}", status),
        });
    }
}

pub fn validate_key_project_rows(rows: &[KeyProject]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (idx, k) in rows.iter().enumerate() {
        let row = idx + 1;
        require_text(&mut issues, row, "项目名称", &k.project_name);
        require_text(&mut issues, row, "项目编码", &k.project_code);
        require_text(&mut issues, row, "所属区域", &k.area);
        require_text(&mut issues, row, "项目类别", &k.category);
        require_text(&mut issues, row, "重点等级", &k.priority_level);
        require_text(&mut issues, row, "建设单位", &k.construction_unit);
        require_text(&mut issues, row, "项目主管部门", &k.department);
        let level = k.priority_level.as_str();
        if !level.is_empty() && !PRIORITY_LEVEL_OPTIONS.contains(&level) {
            issues.push(ValidationIssue {
                row,
                level: IssueLevel::Error,
                field: "重点等级",
                message: format!("unknown priority level: {}", level),
            });
        }
        // Optional, but when given it must be a non-negative amount.
        let investment_ok = match &k.total_investment {
            None => true,
            Some(RawAmount::Number(v)) => v.is_finite() && *v >= 0.0,
            Some(RawAmount::Text(s)) => {
                s.trim().is_empty() || parse_amount_text(s).is_some_and(|v| v >= 0.0)
            }
        };
        if !investment_ok {
            issues.push(ValidationIssue {
                row,
                level: IssueLevel::Error,
                field: "总投资(万元)",
                message: "total investment must be a non-negative number".to_string(),
            });
        }
        check_status(&mut issues, row, &k.status);
    }
    issues
}
