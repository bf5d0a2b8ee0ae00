/// 組織機能推定の統合テスト
///
/// オブジェクト名一覧からの機能タグ推定と推奨オブジェクトの導出を検証します。

#[cfg(test)]
mod org_features_tests {
    use sf2sql::services::org_features::{recommend_objects, sniff_features, FeatureTag};
    use std::collections::BTreeSet;

    #[test]
    fn test_no_indicator_means_sales() {
        let names = ["Account", "Contact", "Lead", "Widget__c"];
        assert_eq!(sniff_features(&names), BTreeSet::from([FeatureTag::Sales]));
    }

    #[test]
    fn test_namespace_prefix_tags_feature_and_drops_sales() {
        let names = ["Account", "npe01__OppPayment__c"];
        let features = sniff_features(&names);

        assert!(features.contains(&FeatureTag::DonorManagement));
        assert!(!features.contains(&FeatureTag::Sales));
    }

    #[test]
    fn test_empty_org_is_sales() {
        let names: [&str; 0] = [];
        assert_eq!(sniff_features(&names), BTreeSet::from([FeatureTag::Sales]));
        assert!(recommend_objects(&names).is_empty());
    }

    #[test]
    fn test_recommendation_is_union_without_duplicates() {
        // Account は募金・寄付者管理の両方の推奨に含まれる
        let names = [
            "Account",
            "Contact",
            "npsp__Allocation__c",
            "npo02__Household__c",
            "Solution",
        ];
        let recommended = recommend_objects(&names);

        let as_vec: Vec<&str> = recommended.iter().map(String::as_str).collect();
        assert_eq!(
            as_vec,
            vec!["Account", "Contact", "npo02__Household__c", "npsp__Allocation__c"]
        );
    }

    #[test]
    fn test_recommendation_limited_to_existing_objects() {
        let names = ["GiftTransaction"];
        let recommended = recommend_objects(&names);

        assert_eq!(recommended, BTreeSet::from(["GiftTransaction".to_string()]));
    }

    #[test]
    fn test_feature_tags_display_kebab_case() {
        assert_eq!(FeatureTag::DonorManagement.to_string(), "donor-management");
        assert_eq!(
            serde_json::to_value(FeatureTag::EducationCloud).unwrap(),
            serde_json::json!("education-cloud")
        );
    }
}
