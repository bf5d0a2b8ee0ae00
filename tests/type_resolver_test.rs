/// 型解決の統合テスト
///
/// リモート型タグから意味型への解決と、設定による上書きの範囲を検証します。

#[cfg(test)]
mod type_resolver_tests {
    use sf2sql::core::field_type::{resolve, SemanticType, BASE_TYPE_TABLE};
    use sf2sql::core::preferences::{LookupType, PicklistType, PreferenceSet};

    fn overridden_preferences() -> PreferenceSet {
        let mut prefs = PreferenceSet::default();
        prefs.picklists.picklist_type = PicklistType::String;
        prefs.lookups.lookup_type = LookupType::VarChar;
        prefs
    }

    #[test]
    fn test_every_base_tag_resolves_to_table_entry() {
        let prefs = PreferenceSet::default();
        for (tag, expected) in BASE_TYPE_TABLE {
            assert_eq!(resolve(tag, &prefs), *expected, "tag: {}", tag);
        }
    }

    #[test]
    fn test_overrides_only_touch_picklist_and_reference() {
        let prefs = overridden_preferences();
        for (tag, expected) in BASE_TYPE_TABLE {
            let resolved = resolve(tag, &prefs);
            match *tag {
                "picklist" | "reference" => assert_eq!(resolved, SemanticType::String),
                _ => assert_eq!(resolved, *expected, "tag: {}", tag),
            }
        }
    }

    #[test]
    fn test_unknown_tag_falls_back_to_text() {
        let prefs = PreferenceSet::default();
        assert_eq!(resolve("anyType", &prefs), SemanticType::Text);
        assert_eq!(resolve("", &prefs), SemanticType::Text);
    }

    #[test]
    fn test_resolution_is_deterministic_across_threads() {
        let prefs = PreferenceSet::default();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let prefs = prefs.clone();
                std::thread::spawn(move || {
                    BASE_TYPE_TABLE
                        .iter()
                        .map(|(tag, _)| resolve(tag, &prefs))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let expected: Vec<SemanticType> = BASE_TYPE_TABLE.iter().map(|(_, t)| *t).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
