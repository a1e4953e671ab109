use proptest::prelude::*;

use skill_sync::sync::{Mode, SyncEngine, SyncMode, merge_delta, normalize};
use skill_sync::test_utils::fixtures::SkillWorkspace;

/// Documents built from the fragments the normalizer actually rewrites.
fn document() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("---".to_string()),
        Just("\n".to_string()),
        Just("\r\n".to_string()),
        Just("\r".to_string()),
        Just("\u{feff}".to_string()),
        Just("{{COMMON_BLOCKS}}".to_string()),
        Just("  ".to_string()),
        Just("\t".to_string()),
        Just("name: x".to_string()),
        Just("title: y ---".to_string()),
        "[a-z# ]{0,8}",
    ];
    prop::collection::vec(fragment, 0..24).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn test_normalize_idempotent_in_check_mode(text in document()) {
        let once = normalize(&text, Mode::Check);
        let twice = normalize(&once.text, Mode::Check);
        prop_assert_eq!(&once.text, &twice.text);
        prop_assert_eq!(once.frontmatter_error, twice.frontmatter_error);
    }

    #[test]
    fn test_normalize_idempotent_in_fix_mode(text in document()) {
        let once = normalize(&text, Mode::Fix);
        let twice = normalize(&once.text, Mode::Fix);
        prop_assert_eq!(&once.text, &twice.text);
    }

    #[test]
    fn test_normalize_arbitrary_text_idempotent(text in ".*") {
        let once = normalize(&text, Mode::Fix).text;
        prop_assert_eq!(normalize(&once, Mode::Fix).text, once);
    }

    #[test]
    fn test_normalized_text_ends_with_single_newline(text in document()) {
        let out = normalize(&text, Mode::Check).text;
        prop_assert!(out.ends_with('\n'));
        prop_assert!(!out.ends_with("\n\n"));
        prop_assert!(!out.contains('\r'));
        prop_assert!(!out.contains("\n\n\n"));
    }

    #[test]
    fn test_blank_delta_is_identity(body in "[ \t\n]*", base in "[a-z .]{0,20}") {
        let block = format!("<rule>\n{base}\n</rule>");
        prop_assert_eq!(merge_delta(&block, "rule", &body).unwrap(), block);
    }

    #[test]
    fn test_delta_lands_before_closing(base in "[a-z .]{1,20}", delta in "[a-z][a-z .]{0,19}") {
        let block = format!("<rule>\n{base}\n</rule>");
        let merged = merge_delta(&block, "rule", &delta).unwrap();
        prop_assert_eq!(merged, format!("<rule>\n{base}\n{delta}\n</rule>"));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_fix_idempotent(body in "[a-z# \n]{0,40}", blank_lines in 0usize..4) {
        let ws = SkillWorkspace::standard();
        let padding = "\n".repeat(blank_lines);
        ws.write_skill_source(
            "alpha",
            &format!("---\nname: alpha\n---\n{padding}{body}{padding}{{{{COMMON_BLOCKS}}}}{padding}{body}"),
        );
        ws.map_skill("alpha", "concise");
        let config = ws.config();
        let engine = SyncEngine::new(ws.root(), &config);

        let first = engine.run(SyncMode::Fix).unwrap();
        prop_assert!(first.errors.is_empty());
        let second = engine.run(SyncMode::Fix).unwrap();
        prop_assert!(second.wrote_nothing());
        prop_assert!(engine.run(SyncMode::Check).unwrap().is_clean());
    }
}
