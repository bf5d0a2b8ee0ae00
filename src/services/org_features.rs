// 組織機能の推定と推奨オブジェクト
//
// 取得したオブジェクト名の一覧から、インストール済みの機能パッケージを推定し、
// UIで初期選択する「推奨オブジェクト」を導出します。
// あくまで選択の補助であり、誤検出・見逃しはスキーマの正しさに影響しません。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// カスタムオブジェクトの接尾辞
pub const CUSTOM_OBJECT_SUFFIX: &str = "__c";

/// 機能タグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureTag {
    Sales,
    Fundraising,
    DonorManagement,
    CaseManagement,
    ProgramManagement,
    OutcomeManagement,
    EducationCloud,
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureTag::Sales => "sales",
            FeatureTag::Fundraising => "fundraising",
            FeatureTag::DonorManagement => "donor-management",
            FeatureTag::CaseManagement => "case-management",
            FeatureTag::ProgramManagement => "program-management",
            FeatureTag::OutcomeManagement => "outcome-management",
            FeatureTag::EducationCloud => "education-cloud",
        };
        write!(f, "{}", name)
    }
}

/// 名前空間プレフィックスによる判定
const NAMESPACE_INDICATORS: &[(&str, FeatureTag)] = &[
    ("npsp__", FeatureTag::Fundraising),
    ("npe03__", FeatureTag::Fundraising),
    ("npe01__", FeatureTag::DonorManagement),
    ("npo02__", FeatureTag::DonorManagement),
    ("npe4__", FeatureTag::DonorManagement),
    ("npe5__", FeatureTag::DonorManagement),
    ("caseman__", FeatureTag::CaseManagement),
    ("pmdm__", FeatureTag::ProgramManagement),
];

/// オブジェクト名の完全一致による判定
const OBJECT_INDICATORS: &[(&str, FeatureTag)] = &[
    ("GiftTransaction", FeatureTag::Fundraising),
    ("GiftCommitment", FeatureTag::Fundraising),
    ("CaseParticipant", FeatureTag::CaseManagement),
    ("CarePlan", FeatureTag::CaseManagement),
    ("ProgramEnrollment", FeatureTag::ProgramManagement),
    ("BenefitDisbursement", FeatureTag::ProgramManagement),
    ("Indicator", FeatureTag::OutcomeManagement),
    ("IndicatorAssignment", FeatureTag::OutcomeManagement),
    ("Outcome", FeatureTag::OutcomeManagement),
    ("LearnerProfile", FeatureTag::EducationCloud),
    ("AcademicTerm", FeatureTag::EducationCloud),
    ("LearningProgram", FeatureTag::EducationCloud),
];

impl FeatureTag {
    /// 機能ごとの推奨標準オブジェクト
    pub fn recommended_objects(&self) -> &'static [&'static str] {
        match self {
            FeatureTag::Sales => &[
                "Account",
                "Contact",
                "Lead",
                "Opportunity",
                "OpportunityContactRole",
                "OpportunityLineItem",
                "Campaign",
                "CampaignMember",
                "Case",
                "Product2",
                "Pricebook2",
                "PricebookEntry",
                "Task",
                "Event",
                "User",
            ],
            FeatureTag::Fundraising => &[
                "Account",
                "Contact",
                "Opportunity",
                "OpportunityContactRole",
                "Campaign",
                "CampaignMember",
                "GiftTransaction",
                "GiftCommitment",
                "GiftDesignation",
                "GiftSoftCredit",
                "npe03__Recurring_Donation__c",
                "npsp__Allocation__c",
                "npsp__General_Accounting_Unit__c",
                "npe01__OppPayment__c",
            ],
            FeatureTag::DonorManagement => &[
                "Account",
                "Contact",
                "Opportunity",
                "npe01__OppPayment__c",
                "npo02__Household__c",
                "npe4__Relationship__c",
                "npe5__Affiliation__c",
            ],
            FeatureTag::CaseManagement => &[
                "Account",
                "Contact",
                "Case",
                "CaseParticipant",
                "CarePlan",
                "Task",
            ],
            FeatureTag::ProgramManagement => &[
                "Account",
                "Contact",
                "Program",
                "ProgramEnrollment",
                "BenefitDisbursement",
                "pmdm__Program__c",
                "pmdm__ProgramEngagement__c",
                "pmdm__ServiceDelivery__c",
            ],
            FeatureTag::OutcomeManagement => &[
                "Indicator",
                "IndicatorAssignment",
                "IndicatorResult",
                "Outcome",
                "OutcomeActivity",
            ],
            FeatureTag::EducationCloud => &[
                "Account",
                "Contact",
                "AcademicTerm",
                "AcademicTermEnrollment",
                "LearnerProfile",
                "LearningProgram",
                "ContactProfile",
            ],
        }
    }
}

/// オブジェクト名の一覧から機能タグを推定
///
/// 特定機能の指標が1つも見つからなければ `{Sales}` を返します。
pub fn sniff_features<S: AsRef<str>>(object_names: &[S]) -> BTreeSet<FeatureTag> {
    let mut features = BTreeSet::new();

    for name in object_names {
        let name = name.as_ref();
        for (prefix, tag) in NAMESPACE_INDICATORS {
            if name.starts_with(prefix) {
                features.insert(*tag);
            }
        }
        for (object, tag) in OBJECT_INDICATORS {
            if name == *object {
                features.insert(*tag);
            }
        }
    }

    if features.is_empty() {
        features.insert(FeatureTag::Sales);
    }

    features
}

/// カスタムオブジェクトかどうか
pub fn is_custom_object(name: &str) -> bool {
    name.ends_with(CUSTOM_OBJECT_SUFFIX)
}

/// 推奨オブジェクトを導出
///
/// 検出された全機能の推奨リストの和集合と、全カスタムオブジェクトを返します。
/// 組織に存在するオブジェクトだけを対象とし、結果に重複は含まれません。
pub fn recommend_objects<S: AsRef<str>>(object_names: &[S]) -> BTreeSet<String> {
    let features = sniff_features(object_names);
    let allow_list: BTreeSet<&str> = features
        .iter()
        .flat_map(|tag| tag.recommended_objects().iter().copied())
        .collect();

    object_names
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| allow_list.contains(name) || is_custom_object(name))
        .map(str::to_string)
        .collect()
}
