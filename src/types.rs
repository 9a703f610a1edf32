use crate::catalog::{FineBucket, FundingNature};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Amount as it arrives from storage or import: either a JSON number or
/// free text. Coercion to `f64` happens in `util::coerce_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

impl From<f64> for RawAmount {
    fn from(v: f64) -> Self {
        RawAmount::Number(v)
    }
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        RawAmount::Text(s.to_string())
    }
}

/// One funding allocation event in the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FundingRecord {
    pub project_code: String,
    pub project_name: String,
    pub area: String,
    pub category: String,
    pub construction_unit: String,
    pub department: String,
    pub budget_amount: Option<RawAmount>,
    pub funding_amount: Option<RawAmount>,
    pub funding_source: String,
    pub funding_nature: String,
    // Bookkeeping fields; carried through storage, ignored by the engine.
    pub approval_date: String,
    pub document_number: String,
    pub operator: String,
    pub operator_department: String,
    pub status: String,
    pub remark: String,
}

/// Registry entry for a construction project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    pub project_name: String,
    pub project_code: String,
    pub area: String,
    pub category: String,
    pub construction_unit: String,
    pub department: String,
    pub approval_time: String,
    pub budget_amount: Option<RawAmount>,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
}

/// Row of the "key projects" highlight list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyProject {
    pub project_name: String,
    pub project_code: String,
    pub area: String,
    pub category: String,
    pub priority_level: String,
    pub construction_unit: String,
    pub department: String,
    pub total_investment: Option<RawAmount>,
    pub construction_period: String,
    pub status: String,
    pub description: String,
}

/// Per-project rollup of every funding record sharing a project code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFundingSummary {
    pub project_code: String,
    pub project_name: String,
    pub area: String,
    pub category: String,
    pub construction_unit: String,
    pub department: String,
    pub budget_amount: Option<RawAmount>,
    pub local_funding: f64,
    pub central_funding: f64,
    pub provincial_funding: f64,
    pub total_funding: f64,
    pub local_general_bonds: f64,
    pub local_special_bonds: f64,
    pub land_sale_revenue: f64,
    pub general_public_budget: f64,
    pub central_budget_investment: f64,
    pub central_subsidy: f64,
    pub central_special_funds: f64,
    pub treasury_bonds: f64,
    pub ultra_long_treasury_bonds: f64,
    pub anti_epidemic_bonds: f64,
    pub provincial_subsidy: f64,
    pub provincial_special_funds: f64,
}

impl ProjectFundingSummary {
    pub fn nature_total(&self, nature: FundingNature) -> f64 {
        match nature {
            FundingNature::Local => self.local_funding,
            FundingNature::Central => self.central_funding,
            FundingNature::Provincial => self.provincial_funding,
        }
    }

    pub fn nature_total_mut(&mut self, nature: FundingNature) -> &mut f64 {
        match nature {
            FundingNature::Local => &mut self.local_funding,
            FundingNature::Central => &mut self.central_funding,
            FundingNature::Provincial => &mut self.provincial_funding,
        }
    }

    pub fn bucket(&self, bucket: FineBucket) -> f64 {
        match bucket {
            FineBucket::LocalGeneralBonds => self.local_general_bonds,
            FineBucket::LocalSpecialBonds => self.local_special_bonds,
            FineBucket::LandSaleRevenue => self.land_sale_revenue,
            FineBucket::GeneralPublicBudget => self.general_public_budget,
            FineBucket::CentralBudgetInvestment => self.central_budget_investment,
            FineBucket::CentralSubsidy => self.central_subsidy,
            FineBucket::CentralSpecialFunds => self.central_special_funds,
            FineBucket::TreasuryBonds => self.treasury_bonds,
            FineBucket::UltraLongTreasuryBonds => self.ultra_long_treasury_bonds,
            FineBucket::AntiEpidemicBonds => self.anti_epidemic_bonds,
            FineBucket::ProvincialSubsidy => self.provincial_subsidy,
            FineBucket::ProvincialSpecialFunds => self.provincial_special_funds,
        }
    }

    pub fn bucket_mut(&mut self, bucket: FineBucket) -> &mut f64 {
        match bucket {
            FineBucket::LocalGeneralBonds => &mut self.local_general_bonds,
            FineBucket::LocalSpecialBonds => &mut self.local_special_bonds,
            FineBucket::LandSaleRevenue => &mut self.land_sale_revenue,
            FineBucket::GeneralPublicBudget => &mut self.general_public_budget,
            FineBucket::CentralBudgetInvestment => &mut self.central_budget_investment,
            FineBucket::CentralSubsidy => &mut self.central_subsidy,
            FineBucket::CentralSpecialFunds => &mut self.central_special_funds,
            FineBucket::TreasuryBonds => &mut self.treasury_bonds,
            FineBucket::UltraLongTreasuryBonds => &mut self.ultra_long_treasury_bonds,
            FineBucket::AntiEpidemicBonds => &mut self.anti_epidemic_bonds,
            FineBucket::ProvincialSubsidy => &mut self.provincial_subsidy,
            FineBucket::ProvincialSpecialFunds => &mut self.provincial_special_funds,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    pub total_projects: usize,
    pub total_budget: f64,
    pub total_funding: f64,
    pub total_local_funding: f64,
    pub total_central_funding: f64,
    pub total_provincial_funding: f64,
}

/// Project count plus the four funding sums of one cross-tab group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotals {
    pub project_count: usize,
    pub total_funding: f64,
    pub local_funding: f64,
    pub central_funding: f64,
    pub provincial_funding: f64,
}

impl GroupTotals {
    pub fn add(&mut self, s: &ProjectFundingSummary) {
        self.project_count += 1;
        self.total_funding += s.total_funding;
        self.local_funding += s.local_funding;
        self.central_funding += s.central_funding;
        self.provincial_funding += s.provincial_funding;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStats {
    pub area: String,
    #[serde(flatten)]
    pub totals: GroupTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    #[serde(flatten)]
    pub totals: GroupTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub project_summaries: Vec<ProjectFundingSummary>,
    pub total_stats: TotalStats,
    pub area_stats: Vec<AreaStats>,
    pub category_stats: Vec<CategoryStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFundingDetails {
    pub total: f64,
    pub general_bonds: f64,
    pub special_bonds: f64,
    pub land_sale_revenue: f64,
    pub general_public_budget: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralFundingDetails {
    pub total: f64,
    pub budget_investment: f64,
    pub subsidy: f64,
    pub special_funds: f64,
    pub treasury_bonds: f64,
    pub ultra_long_treasury_bonds: f64,
    pub anti_epidemic_bonds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvincialFundingDetails {
    pub total: f64,
    pub subsidy: f64,
    pub special_funds: f64,
}

/// Three-nature breakdown with every fine sub-total under its own nature.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStats {
    pub local_funding_details: LocalFundingDetails,
    pub central_funding_details: CentralFundingDetails,
    pub provincial_funding_details: ProvincialFundingDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFundingCross {
    pub area: String,
    pub local_funding: LocalFundingDetails,
    pub central_funding: CentralFundingDetails,
    pub provincial_funding: ProvincialFundingDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedReport {
    pub project_summaries: Vec<ProjectFundingSummary>,
    pub detailed_stats: DetailedStats,
    pub area_funding_cross_stats: Vec<AreaFundingCross>,
}

// Export rows. Column headers follow the spreadsheet templates; amounts are
// in 万元 and pre-rendered with `util::format_amount`.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SummaryExportRow {
    #[serde(rename = "项目名称")]
    #[tabled(rename = "项目名称")]
    pub project_name: String,
    #[serde(rename = "项目编码")]
    #[tabled(rename = "项目编码")]
    pub project_code: String,
    #[serde(rename = "所属区域")]
    #[tabled(rename = "所属区域")]
    pub area: String,
    #[serde(rename = "项目类别")]
    #[tabled(rename = "项目类别")]
    pub category: String,
    #[serde(rename = "建设单位")]
    #[tabled(rename = "建设单位")]
    pub construction_unit: String,
    #[serde(rename = "项目主管部门")]
    #[tabled(rename = "项目主管部门")]
    pub department: String,
    #[serde(rename = "概算批复金额(万元)")]
    #[tabled(rename = "概算批复金额(万元)")]
    pub budget_amount: String,
    #[serde(rename = "地方资金合计(万元)")]
    #[tabled(rename = "地方资金合计(万元)")]
    pub local_funding: String,
    #[serde(rename = "中央资金合计(万元)")]
    #[tabled(rename = "中央资金合计(万元)")]
    pub central_funding: String,
    #[serde(rename = "省级资金合计(万元)")]
    #[tabled(rename = "省级资金合计(万元)")]
    pub provincial_funding: String,
    #[serde(rename = "资金总计(万元)")]
    #[tabled(rename = "资金总计(万元)")]
    pub total_funding: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DetailedExportRow {
    #[serde(rename = "项目名称")]
    #[tabled(rename = "项目名称")]
    pub project_name: String,
    #[serde(rename = "项目编码")]
    #[tabled(rename = "项目编码")]
    pub project_code: String,
    #[serde(rename = "所属区域")]
    #[tabled(rename = "所属区域")]
    pub area: String,
    #[serde(rename = "项目类别")]
    #[tabled(rename = "项目类别")]
    pub category: String,
    #[serde(rename = "地方-一般债券")]
    #[tabled(rename = "地方-一般债券")]
    pub local_general_bonds: String,
    #[serde(rename = "地方-专项债券")]
    #[tabled(rename = "地方-专项债券")]
    pub local_special_bonds: String,
    #[serde(rename = "地方-土地出让金")]
    #[tabled(rename = "地方-土地出让金")]
    pub land_sale_revenue: String,
    #[serde(rename = "地方-一般公共预算")]
    #[tabled(rename = "地方-一般公共预算")]
    pub general_public_budget: String,
    #[serde(rename = "中央-预算内投资")]
    #[tabled(rename = "中央-预算内投资")]
    pub central_budget_investment: String,
    #[serde(rename = "中央-中央补助")]
    #[tabled(rename = "中央-中央补助")]
    pub central_subsidy: String,
    #[serde(rename = "中央-中央专项")]
    #[tabled(rename = "中央-中央专项")]
    pub central_special_funds: String,
    #[serde(rename = "中央-国债")]
    #[tabled(rename = "中央-国债")]
    pub treasury_bonds: String,
    #[serde(rename = "中央-超长期国债")]
    #[tabled(rename = "中央-超长期国债")]
    pub ultra_long_treasury_bonds: String,
    #[serde(rename = "中央-抗疫特别国债")]
    #[tabled(rename = "中央-抗疫特别国债")]
    pub anti_epidemic_bonds: String,
    #[serde(rename = "省级-省级补助")]
    #[tabled(rename = "省级-省级补助")]
    pub provincial_subsidy: String,
    #[serde(rename = "省级-省级专项")]
    #[tabled(rename = "省级-省级专项")]
    pub provincial_special_funds: String,
}

/// Area or category cross-tab row.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GroupStatsRow {
    #[serde(rename = "分组")]
    #[tabled(rename = "分组")]
    pub group: String,
    #[serde(rename = "项目数量")]
    #[tabled(rename = "项目数量")]
    pub project_count: usize,
    #[serde(rename = "资金总额(万元)")]
    #[tabled(rename = "资金总额(万元)")]
    pub total_funding: String,
    #[serde(rename = "地方资金(万元)")]
    #[tabled(rename = "地方资金(万元)")]
    pub local_funding: String,
    #[serde(rename = "中央资金(万元)")]
    #[tabled(rename = "中央资金(万元)")]
    pub central_funding: String,
    #[serde(rename = "省级资金(万元)")]
    #[tabled(rename = "省级资金(万元)")]
    pub provincial_funding: String,
}

// Table exports below reuse the import template headers, so an exported
// sheet loads back through `loader` unchanged. Amounts keep what was entered.

#[derive(Debug, Serialize, Clone)]
pub struct FundingLedgerRow {
    #[serde(rename = "项目名称")]
    pub project_name: String,
    #[serde(rename = "项目编码")]
    pub project_code: String,
    #[serde(rename = "所属区域")]
    pub area: String,
    #[serde(rename = "项目类别")]
    pub category: String,
    #[serde(rename = "建设单位")]
    pub construction_unit: String,
    #[serde(rename = "项目主管部门")]
    pub department: String,
    #[serde(rename = "概算批复金额")]
    pub budget_amount: String,
    #[serde(rename = "资金批复金额")]
    pub funding_amount: String,
    #[serde(rename = "批复日期")]
    pub approval_date: String,
    #[serde(rename = "资金具体来源")]
    pub funding_source: String,
    #[serde(rename = "资金性质")]
    pub funding_nature: String,
    #[serde(rename = "财预文号")]
    pub document_number: String,
    #[serde(rename = "经办人")]
    pub operator: String,
    #[serde(rename = "经办处室")]
    pub operator_department: String,
    #[serde(rename = "项目状态")]
    pub status: String,
    #[serde(rename = "备注")]
    pub remark: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ProjectRegistryRow {
    #[serde(rename = "项目名称")]
    pub project_name: String,
    #[serde(rename = "项目编码")]
    pub project_code: String,
    #[serde(rename = "所属区域")]
    pub area: String,
    #[serde(rename = "项目类别")]
    pub category: String,
    #[serde(rename = "建设单位")]
    pub construction_unit: String,
    #[serde(rename = "项目主管部门")]
    pub department: String,
    #[serde(rename = "立项时间")]
    pub approval_time: String,
    #[serde(rename = "概算批复金额")]
    pub budget_amount: String,
    #[serde(rename = "（预计）开工时间")]
    pub start_time: String,
    #[serde(rename = "（预计）完工时间")]
    pub end_time: String,
    #[serde(rename = "项目状态")]
    pub status: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct KeyProjectRow {
    #[serde(rename = "项目名称")]
    pub project_name: String,
    #[serde(rename = "项目编码")]
    pub project_code: String,
    #[serde(rename = "所属区域")]
    pub area: String,
    #[serde(rename = "项目类别")]
    pub category: String,
    #[serde(rename = "重点等级")]
    pub priority_level: String,
    #[serde(rename = "建设单位")]
    pub construction_unit: String,
    #[serde(rename = "项目主管部门")]
    pub department: String,
    #[serde(rename = "总投资(万元)")]
    pub total_investment: String,
    #[serde(rename = "建设周期")]
    pub construction_period: String,
    #[serde(rename = "项目状态")]
    pub status: String,
    #[serde(rename = "项目描述")]
    pub description: String,
}
