// Funding classification catalogue.
//
// Records carry `fundingNature` and `fundingSource` as free text. This module
// owns the closed set of recognized values and the single table that ties a
// fine source to its canonical nature and its sub-total bucket.
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Coarse government tier of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundingNature {
    Local,
    Central,
    Provincial,
}

impl FundingNature {
    pub const ALL: [FundingNature; 3] = [
        FundingNature::Local,
        FundingNature::Central,
        FundingNature::Provincial,
    ];

    /// Exact string match; no trimming, no case folding.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "地方" => Some(FundingNature::Local),
            "中央" => Some(FundingNature::Central),
            "省级" => Some(FundingNature::Provincial),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FundingNature::Local => "地方",
            FundingNature::Central => "中央",
            FundingNature::Provincial => "省级",
        }
    }
}

/// Sub-total bucket inside a project summary. Every source but
/// `CentralComprehensiveCapacity` owns exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FineBucket {
    LocalGeneralBonds,
    LocalSpecialBonds,
    LandSaleRevenue,
    GeneralPublicBudget,
    CentralBudgetInvestment,
    CentralSubsidy,
    CentralSpecialFunds,
    TreasuryBonds,
    UltraLongTreasuryBonds,
    AntiEpidemicBonds,
    ProvincialSubsidy,
    ProvincialSpecialFunds,
}

impl FineBucket {
    pub const ALL: [FineBucket; 12] = [
        FineBucket::LocalGeneralBonds,
        FineBucket::LocalSpecialBonds,
        FineBucket::LandSaleRevenue,
        FineBucket::GeneralPublicBudget,
        FineBucket::CentralBudgetInvestment,
        FineBucket::CentralSubsidy,
        FineBucket::CentralSpecialFunds,
        FineBucket::TreasuryBonds,
        FineBucket::UltraLongTreasuryBonds,
        FineBucket::AntiEpidemicBonds,
        FineBucket::ProvincialSubsidy,
        FineBucket::ProvincialSpecialFunds,
    ];

    pub fn nature(self) -> FundingNature {
        match self {
            FineBucket::LocalGeneralBonds
            | FineBucket::LocalSpecialBonds
            | FineBucket::LandSaleRevenue
            | FineBucket::GeneralPublicBudget => FundingNature::Local,
            FineBucket::CentralBudgetInvestment
            | FineBucket::CentralSubsidy
            | FineBucket::CentralSpecialFunds
            | FineBucket::TreasuryBonds
            | FineBucket::UltraLongTreasuryBonds
            | FineBucket::AntiEpidemicBonds => FundingNature::Central,
            FineBucket::ProvincialSubsidy | FineBucket::ProvincialSpecialFunds => {
                FundingNature::Provincial
            }
        }
    }

    /// The one source whose amounts land in this bucket.
    pub fn source(self) -> FundingSource {
        match self {
            FineBucket::LocalGeneralBonds => FundingSource::LocalGeneralBonds,
            FineBucket::LocalSpecialBonds => FundingSource::LocalSpecialBonds,
            FineBucket::LandSaleRevenue => FundingSource::LandSaleRevenue,
            FineBucket::GeneralPublicBudget => FundingSource::GeneralPublicBudget,
            FineBucket::CentralBudgetInvestment => FundingSource::CentralBudgetInvestment,
            FineBucket::CentralSubsidy => FundingSource::CentralSubsidy,
            FineBucket::CentralSpecialFunds => FundingSource::CentralSpecialFunds,
            FineBucket::TreasuryBonds => FundingSource::TreasuryBonds,
            FineBucket::UltraLongTreasuryBonds => FundingSource::UltraLongTreasuryBonds,
            FineBucket::AntiEpidemicBonds => FundingSource::AntiEpidemicBonds,
            FineBucket::ProvincialSubsidy => FundingSource::ProvincialSubsidy,
            FineBucket::ProvincialSpecialFunds => FundingSource::ProvincialSpecialFunds,
        }
    }

    /// Column header in the detailed report. Same as the source label except
    /// for budget investment, whose column drops the repeated `中央`.
    pub fn label(self) -> &'static str {
        match self {
            FineBucket::CentralBudgetInvestment => "中央-预算内投资",
            _ => self.source().label(),
        }
    }
}

/// Fine-grained origin of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundingSource {
    LocalGeneralBonds,
    LocalSpecialBonds,
    CentralComprehensiveCapacity,
    LandSaleRevenue,
    GeneralPublicBudget,
    CentralBudgetInvestment,
    CentralSubsidy,
    ProvincialSubsidy,
    ProvincialSpecialFunds,
    CentralSpecialFunds,
    TreasuryBonds,
    UltraLongTreasuryBonds,
    AntiEpidemicBonds,
}

struct SourceEntry {
    source: FundingSource,
    label: &'static str,
    nature: FundingNature,
    bucket: Option<FineBucket>,
}

// Catalogue order matches the form drop-down and the `FundingSource`
// declaration order.
static SOURCE_TABLE: [SourceEntry; 13] = [
    SourceEntry {
        source: FundingSource::LocalGeneralBonds,
        label: "地方-一般债券",
        nature: FundingNature::Local,
        bucket: Some(FineBucket::LocalGeneralBonds),
    },
    SourceEntry {
        source: FundingSource::LocalSpecialBonds,
        label: "地方-专项债券",
        nature: FundingNature::Local,
        bucket: Some(FineBucket::LocalSpecialBonds),
    },
    SourceEntry {
        source: FundingSource::CentralComprehensiveCapacity,
        label: "中央-中央综合财力",
        nature: FundingNature::Central,
        bucket: None,
    },
    SourceEntry {
        source: FundingSource::LandSaleRevenue,
        label: "地方-土地出让金",
        nature: FundingNature::Local,
        bucket: Some(FineBucket::LandSaleRevenue),
    },
    SourceEntry {
        source: FundingSource::GeneralPublicBudget,
        label: "地方-一般公共预算",
        nature: FundingNature::Local,
        bucket: Some(FineBucket::GeneralPublicBudget),
    },
    SourceEntry {
        source: FundingSource::CentralBudgetInvestment,
        label: "中央-中央预算内投资",
        nature: FundingNature::Central,
        bucket: Some(FineBucket::CentralBudgetInvestment),
    },
    SourceEntry {
        source: FundingSource::CentralSubsidy,
        label: "中央-中央补助",
        nature: FundingNature::Central,
        bucket: Some(FineBucket::CentralSubsidy),
    },
    SourceEntry {
        source: FundingSource::ProvincialSubsidy,
        label: "省级-省级补助",
        nature: FundingNature::Provincial,
        bucket: Some(FineBucket::ProvincialSubsidy),
    },
    SourceEntry {
        source: FundingSource::ProvincialSpecialFunds,
        label: "省级-省级专项",
        nature: FundingNature::Provincial,
        bucket: Some(FineBucket::ProvincialSpecialFunds),
    },
    SourceEntry {
        source: FundingSource::CentralSpecialFunds,
        label: "中央-中央专项",
        nature: FundingNature::Central,
        bucket: Some(FineBucket::CentralSpecialFunds),
    },
    SourceEntry {
        source: FundingSource::TreasuryBonds,
        label: "中央-国债",
        nature: FundingNature::Central,
        bucket: Some(FineBucket::TreasuryBonds),
    },
    SourceEntry {
        source: FundingSource::UltraLongTreasuryBonds,
        label: "中央-超长期国债",
        nature: FundingNature::Central,
        bucket: Some(FineBucket::UltraLongTreasuryBonds),
    },
    SourceEntry {
        source: FundingSource::AntiEpidemicBonds,
        label: "中央-抗疫特别国债",
        nature: FundingNature::Central,
        bucket: Some(FineBucket::AntiEpidemicBonds),
    },
];

static SOURCE_BY_LABEL: Lazy<HashMap<&'static str, FundingSource>> = Lazy::new(|| {
    SOURCE_TABLE
        .iter()
        .map(|e| (e.label, e.source))
        .collect()
});

impl FundingSource {
    // Table rows are laid out in variant declaration order.
    fn entry(self) -> &'static SourceEntry {
        &SOURCE_TABLE[self as usize]
    }

    pub fn all() -> impl Iterator<Item = FundingSource> {
        SOURCE_TABLE.iter().map(|e| e.source)
    }

    pub fn from_label(s: &str) -> Option<Self> {
        SOURCE_BY_LABEL.get(s).copied()
    }

    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Canonical nature implied by the source.
    pub fn nature(self) -> FundingNature {
        self.entry().nature
    }

    pub fn bucket(self) -> Option<FineBucket> {
        self.entry().bucket
    }
}

/// Result of classifying a raw `fundingSource` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClass {
    Known(FundingSource),
    Unrecognized,
}

impl SourceClass {
    pub fn classify(s: &str) -> Self {
        match FundingSource::from_label(s) {
            Some(src) => SourceClass::Known(src),
            None => SourceClass::Unrecognized,
        }
    }

    /// Bucket that receives the amount, if any.
    pub fn bucket(self) -> Option<FineBucket> {
        match self {
            SourceClass::Known(src) => src.bucket(),
            SourceClass::Unrecognized => None,
        }
    }
}

/// Canonical nature for a raw source label, as the entry form derives it.
pub fn nature_for_source(label: &str) -> Option<FundingNature> {
    FundingSource::from_label(label).map(FundingSource::nature)
}

pub const PROJECT_STATUS_OPTIONS: [&str; 4] = ["在建", "续建", "完工", "暂停"];

pub const PRIORITY_LEVEL_OPTIONS: [&str; 4] = ["国家级", "省级", "市级", "区级"];

pub const AREA_OPTIONS: [&str; 7] = [
    "市辖区", "开发区", "高新区", "经济区", "新区", "县城", "乡镇",
];

pub const PROJECT_CATEGORY_OPTIONS: [&str; 8] = [
    "基础设施", "民生工程", "产业项目", "环保项目", "科技项目", "文化项目", "体育项目", "其他",
];

pub const CONSTRUCTION_UNIT_OPTIONS: [&str; 6] = [
    "市政府", "区政府", "国有企业", "民营企业", "合资企业", "其他",
];

pub const DEPARTMENT_OPTIONS: [&str; 10] = [
    "发改委", "住建局", "交通局", "水利局", "环保局", "教育局", "卫健委", "文旅局", "体育局", "其他",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_rows_follow_variant_order() {
        for (i, e) in SOURCE_TABLE.iter().enumerate() {
            assert_eq!(e.source as usize, i);
        }
    }

    #[test]
    fn table_covers_every_source_once() {
        let sources: HashSet<FundingSource> = FundingSource::all().collect();
        assert_eq!(sources.len(), 13);
        let labels: HashSet<&str> = FundingSource::all().map(FundingSource::label).collect();
        assert_eq!(labels.len(), 13);
    }

    #[test]
    fn every_bucket_has_exactly_one_source() {
        for bucket in FineBucket::ALL {
            let owners: Vec<FundingSource> = FundingSource::all()
                .filter(|s| s.bucket() == Some(bucket))
                .collect();
            assert_eq!(owners.len(), 1, "{:?}", bucket);
            assert_eq!(owners[0], bucket.source());
            assert_eq!(owners[0].nature(), bucket.nature());
        }
    }

    #[test]
    fn bucket_labels_follow_source_table() {
        for bucket in FineBucket::ALL {
            let entry = SOURCE_TABLE
                .iter()
                .find(|e| e.bucket == Some(bucket))
                .unwrap();
            if bucket == FineBucket::CentralBudgetInvestment {
                assert_eq!(bucket.label(), "中央-预算内投资");
            } else {
                assert_eq!(bucket.label(), entry.label);
            }
            assert!(bucket.label().starts_with(bucket.nature().label()));
        }
        let labels: HashSet<&str> = FineBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels.len(), 12);
    }

    #[test]
    fn comprehensive_capacity_has_no_bucket() {
        let src = FundingSource::from_label("中央-中央综合财力").unwrap();
        assert_eq!(src, FundingSource::CentralComprehensiveCapacity);
        assert_eq!(src.bucket(), None);
        assert_eq!(src.nature(), FundingNature::Central);
    }

    #[test]
    fn labels_round_trip_through_lookup() {
        for src in FundingSource::all() {
            assert_eq!(FundingSource::from_label(src.label()), Some(src));
        }
        for nature in FundingNature::ALL {
            assert_eq!(FundingNature::from_label(nature.label()), Some(nature));
        }
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(FundingNature::from_label(" 地方"), None);
        assert_eq!(FundingNature::from_label(""), None);
        assert_eq!(SourceClass::classify("unknown"), SourceClass::Unrecognized);
        assert_eq!(SourceClass::classify("地方-一般债券 "), SourceClass::Unrecognized);
        assert_eq!(nature_for_source("省级-省级专项"), Some(FundingNature::Provincial));
        assert_eq!(nature_for_source("nope"), None);
    }
}
